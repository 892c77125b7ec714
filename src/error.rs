use thiserror::Error;

/// Coarse classification of [`AncError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AncError {
    #[error("audio buffer has no channels")]
    NoChannels,
    #[error("audio buffer channels contain no samples")]
    EmptyChannels,
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("processing cancelled after {completed} of {total} channels")]
    Cancelled { completed: usize, total: usize },
}

impl AncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AncError::Cancelled { .. } => ErrorKind::Cancelled,
            _ => ErrorKind::InvalidInput,
        }
    }
}
