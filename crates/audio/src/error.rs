use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid speed factor {0} (must be finite and positive)")]
    InvalidSpeedFactor(f64),
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("invalid click track: {0}")]
    InvalidClickSpec(String),
    #[error("cannot convert {from} channel(s) to {to}")]
    UnsupportedChannels { from: u16, to: u16 },
    #[error("could not encode audio: {0}")]
    Encode(String),
    #[error("audio i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    pub fn decode<T: Into<String>>(message: T) -> Self {
        Self::Decode(message.into())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Self::Io(io),
            other => Self::Encode(other.to_string()),
        }
    }
}
