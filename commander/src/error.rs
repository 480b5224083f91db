use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid configuration for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum CommanderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start input listener: {0}")]
    Listener(#[source] std::io::Error),
}
