use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApolloError>;

#[derive(Debug, Error)]
pub enum ApolloError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApolloError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApolloError::Parse(err.to_string())
        } else {
            ApolloError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApolloError {
    fn from(err: serde_json::Error) -> Self {
        ApolloError::Parse(err.to_string())
    }
}
