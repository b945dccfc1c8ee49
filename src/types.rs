use crate::error::{GpError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Primitive kinds a node can return or accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Object,
    Void,
}

impl fmt::Display for GpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GpType::Boolean => "boolean",
            GpType::Int => "int",
            GpType::Long => "long",
            GpType::Float => "float",
            GpType::Double => "double",
            GpType::Object => "object",
            GpType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Result of executing a node.
///
/// Each variant corresponds to one `GpType`. The typed accessors fail with
/// `GpError::UnsupportedOperation` when asked for a kind the value does not
/// carry, which is how a type-system violation in a tree surfaces at runtime.
#[derive(Clone)]
pub enum Value {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(Arc<dyn Any + Send + Sync>),
    Void,
}

impl Value {
    pub fn gp_type(&self) -> GpType {
        match self {
            Value::Boolean(_) => GpType::Boolean,
            Value::Int(_) => GpType::Int,
            Value::Long(_) => GpType::Long,
            Value::Float(_) => GpType::Float,
            Value::Double(_) => GpType::Double,
            Value::Object(_) => GpType::Object,
            Value::Void => GpType::Void,
        }
    }

    /// Zero value of a kind, used to initialise runtime memory cells.
    /// Object has no zero and maps to `Void`.
    pub fn default_for(gp_type: GpType) -> Value {
        match gp_type {
            GpType::Boolean => Value::Boolean(false),
            GpType::Int => Value::Int(0),
            GpType::Long => Value::Long(0),
            GpType::Float => Value::Float(0.0),
            GpType::Double => Value::Double(0.0),
            GpType::Object | GpType::Void => Value::Void,
        }
    }

    fn unsupported(&self, requested: GpType) -> GpError {
        GpError::UnsupportedOperation {
            node: format!("{:?}", self),
            requested,
            actual: self.gp_type(),
        }
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.unsupported(GpType::Boolean)),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.unsupported(GpType::Int)),
        }
    }

    pub fn as_long(&self) -> Result<i64> {
        match self {
            Value::Long(l) => Ok(*l),
            other => Err(other.unsupported(GpType::Long)),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.unsupported(GpType::Float)),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            other => Err(other.unsupported(GpType::Double)),
        }
    }

    pub fn as_object(&self) -> Result<Arc<dyn Any + Send + Sync>> {
        match self {
            Value::Object(o) => Ok(Arc::clone(o)),
            other => Err(other.unsupported(GpType::Object)),
        }
    }

    pub fn as_void(&self) -> Result<()> {
        match self {
            Value::Void => Ok(()),
            other => Err(other.unsupported(GpType::Void)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Long(l) => write!(f, "Long({})", l),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Double(x) => write!(f, "Double({})", x),
            Value::Object(_) => write!(f, "Object(..)"),
            Value::Void => write!(f, "Void"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

/// Literal carried by constant nodes, in a form that can be serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Long(l) => Value::Long(*l),
            Literal::Float(f) => Value::Float(*f),
            Literal::Double(d) => Value::Double(*d),
        }
    }
}

impl Literal {
    pub fn gp_type(&self) -> GpType {
        match self {
            Literal::Boolean(_) => GpType::Boolean,
            Literal::Int(_) => GpType::Int,
            Literal::Long(_) => GpType::Long,
            Literal::Float(_) => GpType::Float,
            Literal::Double(_) => GpType::Double,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Long(l) => write!(f, "{}L", l),
            Literal::Float(x) => write!(f, "{}f", x),
            Literal::Double(x) => write!(f, "{}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_accessor_is_unsupported() {
        let value = Value::Int(7);
        assert_eq!(value.as_int().unwrap(), 7);
        match value.as_double() {
            Err(GpError::UnsupportedOperation { requested, actual, .. }) => {
                assert_eq!(requested, GpType::Double);
                assert_eq!(actual, GpType::Int);
            }
            other => panic!("expected unsupported operation, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_to_value() {
        let value = Value::from(&Literal::Double(2.5));
        assert_eq!(value, Value::Double(2.5));
        assert_eq!(Literal::Long(3).gp_type(), GpType::Long);
    }
}
