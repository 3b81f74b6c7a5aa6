use hydrate_core::{
    stmt::{Value, ValueRecord},
    Result,
};
use uuid::Uuid;

/// Converts an attribute value into a Rust type.
pub trait Load: Sized {
    fn load(value: Value) -> Result<Self>;
}

macro_rules! impl_load_via_try_from {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl Load for $ty {
                fn load(value: Value) -> Result<Self> {
                    value.try_into()
                }
            }
        )*
    };
}

impl_load_via_try_from!(bool, i32, i64, String, Vec<u8>, Uuid);

impl Load for Value {
    fn load(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl Load for ValueRecord {
    fn load(value: Value) -> Result<Self> {
        value.to_record()
    }
}

impl<T: Load> Load for Option<T> {
    fn load(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::load(value)?))
        }
    }
}
