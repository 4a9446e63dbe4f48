use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Restriction error: {message}")]
    Restriction { message: String },

    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Unknown validator: {name}")]
    UnknownValidator { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DictionaryError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn restriction(message: impl Into<String>) -> Self {
        Self::Restriction {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DictionaryError>;
