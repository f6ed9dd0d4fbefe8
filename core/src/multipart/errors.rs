#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultipartError {
    /// A caller-supplied boundary is empty or would break the framing.
    #[error("invalid multipart boundary {boundary:?}: {reason}")]
    InvalidBoundary {
        boundary: String,
        reason: &'static str,
    },
}
