use hydrate_core::{
    schema::Column,
    stmt::{Type, Value, ValueRecord},
    Error, Result,
};
use uuid::Uuid;

/// Extracts a typed value from a raw row.
///
/// Implementations must be pure: the same row, position and column always
/// decode to the same value.
pub trait Decode {
    /// Decodes the cell at `position` into a value of `column.ty`.
    fn decode(&self, row: &ValueRecord, position: usize, column: &Column) -> Result<Value>;
}

impl<T: Decode + ?Sized> Decode for &T {
    fn decode(&self, row: &ValueRecord, position: usize, column: &Column) -> Result<Value> {
        (**self).decode(row, position, column)
    }
}

/// The default decoder.
///
/// Accepts the cell representations a driver commonly hands back for each
/// declared type: integers of either width, text holding a number, boolean
/// or UUID, and UUIDs stored as 16 raw bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnDecoder;

impl Decode for ColumnDecoder {
    fn decode(&self, row: &ValueRecord, position: usize, column: &Column) -> Result<Value> {
        let Some(raw) = row.get(position) else {
            return Err(Error::decode(
                &column.name,
                position,
                format!("row has only {} columns", row.len()),
            ));
        };

        convert(raw, column).map_err(|reason| Error::decode(&column.name, position, reason))
    }
}

fn convert(raw: &Value, column: &Column) -> std::result::Result<Value, String> {
    let value = match (&column.ty, raw) {
        (_, Value::Null) if column.nullable => Value::Null,
        (_, Value::Null) => return Err("column is not nullable but found Null".into()),

        (Type::Bool, Value::Bool(v)) => Value::Bool(*v),
        (Type::Bool, Value::I32(0) | Value::I64(0)) => Value::Bool(false),
        (Type::Bool, Value::I32(1) | Value::I64(1)) => Value::Bool(true),
        (Type::Bool, Value::String(s)) => match s.as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => return Err(format!("cannot parse {s:?} as Bool")),
        },

        (Type::I32, Value::I32(v)) => Value::I32(*v),
        (Type::I32, Value::I64(v)) => match i32::try_from(*v) {
            Ok(v) => Value::I32(v),
            Err(_) => return Err(format!("{v} is out of range for I32")),
        },
        (Type::I32, Value::String(s)) => Value::I32(parse(s, "I32")?),

        (Type::I64, Value::I64(v)) => Value::I64(*v),
        (Type::I64, Value::I32(v)) => Value::I64((*v).into()),
        (Type::I64, Value::String(s)) => Value::I64(parse(s, "I64")?),

        (Type::String, Value::String(s)) => Value::String(s.clone()),
        (Type::Bytes, Value::Bytes(b)) => Value::Bytes(b.clone()),

        (Type::Uuid, Value::Uuid(v)) => Value::Uuid(*v),
        (Type::Uuid, Value::String(s)) => match Uuid::parse_str(s) {
            Ok(v) => Value::Uuid(v),
            Err(err) => return Err(format!("cannot parse {s:?} as Uuid: {err}")),
        },
        (Type::Uuid, Value::Bytes(b)) => match Uuid::from_slice(b) {
            Ok(v) => Value::Uuid(v),
            Err(_) => return Err(format!("expected 16 bytes for Uuid, found {}", b.len())),
        },

        (ty, raw) => return Err(format!("expected {ty:?}, found {raw:?}")),
    };

    Ok(value)
}

fn parse<T>(s: &str, ty: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.parse().map_err(|err| format!("cannot parse {s:?} as {ty}: {err}"))
}
