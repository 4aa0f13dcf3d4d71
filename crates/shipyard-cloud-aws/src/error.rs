//! AWSアクセスのエラー型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("Failed to decrypt parameter {name}: {message}")]
    DecryptionFailed { name: String, message: String },

    #[error("Repository metadata not found at {key}: {message}")]
    MetadataNotFound { key: String, message: String },

    #[error("Repository metadata at {key} is malformed: {message}")]
    MetadataMalformed { key: String, message: String },

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Secret {name} is malformed: {message}")]
    SecretMalformed { name: String, message: String },

    #[error("AWS API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
