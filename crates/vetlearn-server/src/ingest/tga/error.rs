//! Upstream client error taxonomy

use thiserror::Error;

pub type TgaResult<T> = std::result::Result<T, TgaError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TgaError {
    /// Credentials were rejected; retrying cannot help
    #[error("TGA rejected the configured credentials (HTTP {status})")]
    Auth { status: u16 },

    /// Network failure, timeout, or a 5xx without a SOAP fault
    #[error("TGA transport failure: {0}")]
    Transport(String),

    /// The component, its release or its XML file does not exist upstream
    #[error("{0}")]
    NotFound(String),

    /// The envelope did not have the expected shape, or carried a SOAP fault
    #[error("Malformed TGA response: {0}")]
    Malformed(String),
}

impl TgaError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, TgaError::Transport(_))
    }

    pub fn component_not_found(code: &str) -> Self {
        TgaError::NotFound(format!("Component {} not found in TGA", code))
    }
}

impl From<reqwest::Error> for TgaError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return TgaError::Auth {
                    status: status.as_u16(),
                };
            }
        }
        TgaError::Transport(err.to_string())
    }
}

impl From<quick_xml::de::DeError> for TgaError {
    fn from(err: quick_xml::de::DeError) -> Self {
        TgaError::Malformed(err.to_string())
    }
}
