use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AutomationError {
    /// True for the observation/action race where a control vanished
    /// between being matched and being acted on.
    pub fn is_element_not_found(&self) -> bool {
        matches!(self, AutomationError::ElementNotFound(_))
    }
}
