use super::Error;

/// Error when a query's column layout does not cover an entity's mapping.
///
/// Raised while building the quick-populator plan, before any row is
/// processed. It indicates a mismatch between the compiled query and the
/// mapping, so it is fatal for the whole materialization call.
#[derive(Debug)]
pub(super) struct PlanResolutionError {
    entity: Box<str>,
    message: Box<str>,
}

impl std::error::Error for PlanResolutionError {}

impl core::fmt::Display for PlanResolutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot resolve populators for `{}`: {}",
            self.entity, self.message
        )
    }
}

impl Error {
    /// Creates a plan resolution error.
    pub fn plan_resolution(entity: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PlanResolution(PlanResolutionError {
            entity: entity.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a plan resolution error.
    pub fn is_plan_resolution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PlanResolution(_))
    }
}
