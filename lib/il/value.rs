//! A `Value` is a single value in SSA form.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The underlying type of an SSA value.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Type {
    /// A sized integer type.
    Integer { signed: bool, bits: usize },
    /// A string type. Only its length is modelled.
    String,
    /// Any type the analysis does not model.
    Unsupported,
}

impl Type {
    /// Returns true if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer { .. })
    }

    /// Returns true if this is a signed integer type.
    pub fn is_signed(&self) -> bool {
        match *self {
            Type::Integer { signed, .. } => signed,
            _ => false,
        }
    }

    /// Returns true if this is an unsigned integer type.
    pub fn is_unsigned(&self) -> bool {
        match *self {
            Type::Integer { signed, .. } => !signed,
            _ => false,
        }
    }

    /// Returns true if this is the string type.
    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    /// The width of an integer type, or `None` for any other type.
    pub fn bits(&self) -> Option<usize> {
        match *self {
            Type::Integer { bits, .. } => Some(bits),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Type::Integer { signed: true, bits } => write!(f, "i{}", bits),
            Type::Integer { signed: false, bits } => write!(f, "u{}", bits),
            Type::String => write!(f, "string"),
            Type::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A single SSA value: a name, a type, and, for constants, the literal.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Value {
    index: usize,
    name: String,
    typ: Type,
    literal: Option<BigInt>,
}

impl Value {
    pub(crate) fn new<S: Into<String>>(index: usize, name: S, typ: Type) -> Value {
        Value {
            index,
            name: name.into(),
            typ,
            literal: None,
        }
    }

    pub(crate) fn new_constant(index: usize, literal: BigInt, typ: Type) -> Value {
        Value {
            index,
            name: literal.to_string(),
            typ,
            literal: Some(literal),
        }
    }

    /// The index of this `Value` in its `Function`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The name of this `Value`. Constants are named after their literal.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of this `Value`.
    pub fn typ(&self) -> &Type {
        &self.typ
    }

    /// The literal of a constant `Value`.
    pub fn literal(&self) -> Option<&BigInt> {
        self.literal.as_ref()
    }

    /// Returns true if this `Value` is a constant.
    pub fn is_constant(&self) -> bool {
        self.literal.is_some()
    }

    /// The literal of an integer-typed constant `Value`.
    pub fn integer_literal(&self) -> Option<&BigInt> {
        if self.typ.is_integer() {
            self.literal.as_ref()
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicates() {
        let i64_type = Type::Integer {
            signed: true,
            bits: 64,
        };
        assert!(i64_type.is_integer());
        assert!(i64_type.is_signed());
        assert!(!i64_type.is_unsigned());
        assert_eq!(i64_type.bits(), Some(64));

        let u8_type = Type::Integer {
            signed: false,
            bits: 8,
        };
        assert!(u8_type.is_unsigned());

        assert!(Type::String.is_string());
        assert!(!Type::String.is_integer());
        assert_eq!(Type::String.bits(), None);
    }

    #[test]
    fn test_constant_value() {
        let value = Value::new_constant(
            0,
            BigInt::from(42),
            Type::Integer {
                signed: true,
                bits: 64,
            },
        );
        assert!(value.is_constant());
        assert_eq!(value.name(), "42");
        assert_eq!(value.integer_literal(), Some(&BigInt::from(42)));
    }

    #[test]
    fn test_string_constant_has_no_integer_literal() {
        let value = Value::new_constant(0, BigInt::from(7), Type::String);
        assert!(value.is_constant());
        assert!(value.integer_literal().is_none());
    }
}
