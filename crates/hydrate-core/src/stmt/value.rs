use super::*;
use crate::{Error, Result};

use uuid::Uuid;

/// A dynamically typed value: a raw cell of a row, or a decoded attribute.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Opaque byte string
    Bytes(Vec<u8>),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Null value
    #[default]
    Null,

    /// Record value, used for composite attributes
    Record(ValueRecord),

    /// String value
    String(String),

    /// UUID value
    Uuid(Uuid),
}

impl Value {
    /// Returns a `Value` representing null
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn record_from_vec(fields: Vec<Self>) -> Self {
        ValueRecord::from_vec(fields).into()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(&**v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I64(v) => Some(v),
            Self::I32(v) => Some(v.into()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ValueRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn to_record(self) -> Result<ValueRecord> {
        match self {
            Self::Record(record) => Ok(record),
            value => Err(Error::type_conversion(value, "ValueRecord")),
        }
    }

    /// Returns `true` if the value is an instance of `ty`. Null is an
    /// instance of every type.
    pub fn is_a(&self, ty: &Type) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(_) => ty.is_bool(),
            Self::Bytes(_) => ty.is_bytes(),
            Self::I32(_) => ty.is_i32(),
            Self::I64(_) => ty.is_i64(),
            Self::String(_) => ty.is_string(),
            Self::Uuid(_) => ty.is_uuid(),
            Self::Record(value) => match ty {
                Type::Record(fields) if value.len() == fields.len() => value
                    .iter()
                    .zip(fields.iter())
                    .all(|(value, ty)| value.is_a(ty)),
                _ => false,
            },
        }
    }

    /// Infers the type of the value from its representation.
    pub fn infer_ty(&self) -> Type {
        match self {
            Self::Bool(_) => Type::Bool,
            Self::Bytes(_) => Type::Bytes,
            Self::I32(_) => Type::I32,
            Self::I64(_) => Type::I64,
            Self::Null => Type::Null,
            Self::Record(record) => Type::record(record.iter().map(Value::infer_ty)),
            Self::String(_) => Type::String,
            Self::Uuid(_) => Type::Uuid,
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl AsRef<Self> for Value {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<&[u8]> for Value {
    fn from(src: &[u8]) -> Self {
        Self::Bytes(src.to_vec())
    }
}

impl From<Uuid> for Value {
    fn from(src: Uuid) -> Self {
        Self::Uuid(src)
    }
}

impl From<ValueRecord> for Value {
    fn from(value: ValueRecord) -> Self {
        Self::Record(value)
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}

macro_rules! impl_try_from_value {
    ( $( $variant:ident($ty:ty) ),* $(,)? ) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        value => Err(Error::type_conversion(value, stringify!($ty))),
                    }
                }
            }
        )*
    };
}

impl_try_from_value! {
    Bool(bool),
    Bytes(Vec<u8>),
    String(String),
    Uuid(Uuid),
}

impl TryFrom<Value> for i32 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::I32(v) => Ok(v),
            Value::I64(v) => {
                i32::try_from(v).map_err(|_| Error::type_conversion(Value::I64(v), "i32"))
            }
            value => Err(Error::type_conversion(value, "i32")),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::I64(v) => Ok(v),
            Value::I32(v) => Ok(v.into()),
            value => Err(Error::type_conversion(value, "i64")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_is_a_every_type() {
        for ty in [Type::Bool, Type::I64, Type::String, Type::Uuid] {
            assert!(Value::Null.is_a(&ty));
        }
    }

    #[test]
    fn record_is_a_matching_record_type() {
        let point = Value::record_from_vec(vec![Value::I64(12), Value::I64(23)]);

        assert!(point.is_a(&Type::record([Type::I64, Type::I64])));
        assert!(!point.is_a(&Type::record([Type::I64])));
        assert!(!point.is_a(&Type::record([Type::I64, Type::String])));
        assert_eq!(point.infer_ty(), Type::record([Type::I64, Type::I64]));
    }

    #[test]
    fn integer_conversions_widen_and_check_range() {
        assert_eq!(i64::try_from(Value::I32(7)).unwrap(), 7);
        assert_eq!(i32::try_from(Value::I64(7)).unwrap(), 7);

        let err = i32::try_from(Value::I64(i64::MAX)).unwrap_err();
        assert!(err.is_type_conversion());
        assert_eq!(err.to_string(), "cannot convert I64 to i32");
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("Bob")), Value::from("Bob"));
    }

    #[test]
    fn string_conversion_rejects_other_types() {
        let err = String::try_from(Value::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert Bool to String");
    }
}
