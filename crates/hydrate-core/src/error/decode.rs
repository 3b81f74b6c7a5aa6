use super::Error;

/// Error when a raw cell cannot be decoded into its column's declared type.
///
/// This occurs when:
/// - the stored representation is incompatible (text into an integer slot)
/// - a numeric value is out of range for the declared width
/// - a non-nullable column holds `NULL`
/// - the row is narrower than the requested position
#[derive(Debug)]
pub(super) struct DecodeError {
    column: Box<str>,
    position: usize,
    reason: Box<str>,
}

impl std::error::Error for DecodeError {}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot decode column `{}` at position {}: {}",
            self.column, self.position, self.reason
        )
    }
}

impl Error {
    /// Creates a decode error for the column at `position` in the row.
    pub fn decode(column: impl Into<String>, position: usize, reason: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Decode(DecodeError {
            column: column.into().into(),
            position,
            reason: reason.into().into(),
        }))
    }

    /// Returns `true` if this error is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Decode(_))
    }
}
