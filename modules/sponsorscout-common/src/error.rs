use thiserror::Error;

use crate::types::VerificationStatus;

#[derive(Error, Debug)]
pub enum SponsorScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid verification transition: {from} -> {to}")]
    InvalidTransition {
        from: VerificationStatus,
        to: VerificationStatus,
    },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
