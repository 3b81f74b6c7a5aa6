use super::Error;

/// Error when a composite property's constructor rejects its decoded columns.
///
/// The constructor's own error is attached as the cause, see
/// [`Error::context`].
#[derive(Debug)]
pub(super) struct CompositionError {
    entity: Box<str>,
    property: Box<str>,
}

impl std::error::Error for CompositionError {}

impl core::fmt::Display for CompositionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "composite property `{}.{}` rejected its columns",
            self.entity, self.property
        )
    }
}

impl Error {
    /// Creates a composition error naming the offending property.
    pub fn composition(entity: impl Into<String>, property: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Composition(CompositionError {
            entity: entity.into().into(),
            property: property.into().into(),
        }))
    }

    /// Returns `true` if this error is a composition error.
    pub fn is_composition(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Composition(_))
    }
}
