use thiserror::Error;

/// Errors that stop a listener.
#[derive(Error, Debug)]
pub enum IspError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-request failures. Each endpoint maps these onto its own fixed
/// status and body; they never leave the handler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("uri token {0} not found")]
    TokenNotFound(usize),

    #[error("video id does not carry the required prefix")]
    PrefixMismatch,

    #[error("missing required query argument: {0}")]
    ArgMissing(&'static str),

    #[error("no account found for publisher {0}")]
    AccountNotFound(String),

    #[error("no directive found for video {0}")]
    DirectiveNotFound(String),

    #[error("could not build response: {0}")]
    Allocation(String),
}

impl ApiError {
    /// Short label used to tag error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::TokenNotFound(_) => "token_not_found",
            ApiError::PrefixMismatch => "prefix_mismatch",
            ApiError::ArgMissing(_) => "arg_missing",
            ApiError::AccountNotFound(_) => "account_not_found",
            ApiError::DirectiveNotFound(_) => "directive_not_found",
            ApiError::Allocation(_) => "allocation",
        }
    }
}

impl From<http::header::InvalidHeaderValue> for ApiError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        ApiError::Allocation(err.to_string())
    }
}
