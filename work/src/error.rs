use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkError {
    #[error("work difficulty {actual:#018x} below minimum {minimum:#018x}")]
    InsufficientDifficulty { actual: u64, minimum: u64 },

    #[error("difficulty multiplier must be at least 1.0, got {0}")]
    InvalidMultiplier(f64),
}
