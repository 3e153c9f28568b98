use derive_more::Display;

use crate::token::Literal;

#[derive(Display, Debug, Clone, PartialEq)]
pub enum Value {
    #[display("nil")]
    Nil,

    #[display("{}", _0)]
    Bool(bool),

    #[display("{}", _0)]
    Number(f64),

    #[display("{}", _0)]
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => Value::Nil,
            Literal::Bool(v) => Value::Bool(*v),
            Literal::Number(v) => Value::Number(*v),
            Literal::Str(v) => Value::Str(v.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
    }

    #[test]
    fn equality_needs_matching_types() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Str("1".to_string()), Value::Number(1.0));
        assert_eq!(Value::Number(2.0), Value::Number(2.0));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Str("a b".to_string()).to_string(), "a b");
    }
}
