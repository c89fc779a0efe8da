use thiserror::Error;

/// Failure outcomes of the driver layer.
///
/// Every operation that fails does so before touching the device, so a
/// caller that discards the error still gets the plain no-op behaviour.
#[derive(Debug, Error)]
pub enum UartError {
    #[error("channel {0} is not in the supported set")]
    InvalidChannel(u8),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("input text is absent")]
    NullInput,

    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, UartError>;

impl UartError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidParameter(what.into())
    }
}
