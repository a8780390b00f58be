pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("distance cache requires at least {needed} dimensions, got {got}")]
    TooFewDimensions { needed: usize, got: usize },

    #[error("override length {got} does not match the cluster count {expected}")]
    OverrideLengthMismatch { expected: usize, got: usize },

    #[error("override index {index} is invalid for {len} clusters")]
    OverrideIndexInvalid { index: usize, len: usize },
}
