//! Inference error types.

/// Error kinds surfaced to callers of a model server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum InferenceErrorKind {
    /// The message list is empty or malformed. Caller bug, never retried.
    #[display("Invalid input: {_0}")]
    InvalidInput(String),
    /// A collaborator raised or returned a malformed response.
    #[display("Backend unavailable: {_0}")]
    BackendUnavailable(String),
    /// The rollout produced zero candidates.
    #[display("Rollout produced no candidates")]
    EmptyRollout,
    /// Adapter configuration could not be loaded or is out of range.
    #[display("Configuration error: {_0}")]
    Config(String),
}

/// Inference error with location tracking.
///
/// # Examples
///
/// ```
/// use rollout_error::{InferenceError, InferenceErrorKind};
///
/// let err = InferenceError::new(InferenceErrorKind::EmptyRollout);
/// assert_eq!(err.kind(), &InferenceErrorKind::EmptyRollout);
/// assert!(err.to_string().contains("no candidates"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Inference Error: {} at line {} in {}", kind, line, file)]
pub struct InferenceError {
    kind: InferenceErrorKind,
    line: u32,
    file: &'static str,
}

impl InferenceError {
    /// Create a new inference error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: InferenceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &InferenceErrorKind {
        &self.kind
    }

    /// Line number where the error was raised.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Source file where the error was raised.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// True for failures caused by the caller's input rather than the backend.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self.kind, InferenceErrorKind::InvalidInput(_))
    }
}

impl<T> From<T> for InferenceError
where
    T: Into<InferenceErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
