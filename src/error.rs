pub type BlurResult<T> = Result<T, BlurError>;

#[derive(thiserror::Error, Debug)]
pub enum BlurError {
    #[error("invalid kernel size: {0}")]
    InvalidKernelSize(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlurError {
    pub fn invalid_kernel_size(msg: impl Into<String>) -> Self {
        Self::InvalidKernelSize(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
