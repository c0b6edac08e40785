use crate::authenticator::Authenticator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required option `{0}`")]
    MissingField(&'static str),

    #[error("option `{field}` is required when authenticator is \"{authenticator}\"")]
    MissingCredential {
        field: &'static str,
        authenticator: Authenticator,
    },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown authenticator \"{0}\" (expected one of: legacy, jwt, oauth2)")]
    UnknownAuthenticator(String),

    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("config directory not found")]
    ConfigDirNotFound,

    #[error(
        "provider config file not found. Checked:\n\
        - DECORT_CONFIG_PATH\n\
        - current directory: decort.local.kdl, decort.kdl\n\
        - ./.decort/ directory\n\
        - ~/.config/decort/decort.kdl"
    )]
    ConfigFileNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
