use super::Value;

/// The declared type of a column or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Opaque byte string
    Bytes,

    /// Signed 32-bit integer
    I32,

    /// Signed 64-bit integer
    I64,

    /// String type
    String,

    /// 128-bit universally unique identifier
    Uuid,

    /// A fixed-length tuple where each item can have a different type. This
    /// is the type of composite attribute values.
    Record(Vec<Type>),

    /// The type of `NULL`.
    Null,
}

impl Type {
    pub fn record(fields: impl IntoIterator<Item = Type>) -> Self {
        Self::Record(fields.into_iter().collect())
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Self::Bytes)
    }

    pub fn is_i32(&self) -> bool {
        matches!(self, Self::I32)
    }

    pub fn is_i64(&self) -> bool {
        matches!(self, Self::I64)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    pub fn is_uuid(&self) -> bool {
        matches!(self, Self::Uuid)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    /// Returns `true` if the type is a scalar that a single column can hold.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Record(_) | Self::Null)
    }

    /// Returns `true` if `value` is an instance of this type. `NULL` matches
    /// every type; nullability is checked separately.
    pub fn accepts(&self, value: &Value) -> bool {
        value.is_a(self)
    }
}
