use super::Error;

/// Error when an entity type cannot be instantiated.
///
/// This is a mapping configuration error, raised for example when asked to
/// allocate an abstract entity. Every row of a materialization would fail the
/// same way, so it aborts the whole call before any row is processed.
#[derive(Debug)]
pub(super) struct AllocationError {
    entity: Box<str>,
    reason: Box<str>,
}

impl std::error::Error for AllocationError {}

impl core::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot allocate instance of `{}`: {}",
            self.entity, self.reason
        )
    }
}

impl Error {
    /// Creates an allocation error for the named entity.
    pub fn allocation(entity: impl Into<String>, reason: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Allocation(AllocationError {
            entity: entity.into().into(),
            reason: reason.into().into(),
        }))
    }

    /// Returns `true` if this error is an allocation error.
    pub fn is_allocation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Allocation(_))
    }
}
