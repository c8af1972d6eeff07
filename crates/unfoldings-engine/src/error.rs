//! Render pipeline error types.

use thiserror::Error;

/// Errors raised around a render.
///
/// The DSP itself never fails; these cover cancellation and the hand-off
/// between the render worker and its callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The render was cancelled between pipeline stages.
    #[error("render cancelled")]
    Cancelled,

    /// The background render thread is gone.
    #[error("render worker disconnected")]
    WorkerDisconnected,

    /// A result was requested before anything was rendered.
    #[error("nothing has been rendered yet")]
    NothingRendered,
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(RenderError::Cancelled.to_string(), "render cancelled");
        assert_eq!(
            RenderError::WorkerDisconnected.to_string(),
            "render worker disconnected"
        );
        assert_eq!(
            RenderError::NothingRendered.to_string(),
            "nothing has been rendered yet"
        );
    }
}
