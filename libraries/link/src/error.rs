use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid link URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Unsupported link scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("No driver available for {0}")]
    Unavailable(String),

    #[error("Link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    pub(crate) fn invalid_uri(uri: &str, reason: impl Into<String>) -> Self {
        LinkError::InvalidUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}
