//! Client errors

use catalyst_util::CatalystError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with an error status
    #[error("Error Code: {status}\nMessage: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] CatalystError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message() {
        let err = ClientError::Status {
            status: 404,
            message: "User not found".into(),
        };
        assert_eq!(err.to_string(), "Error Code: 404\nMessage: User not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_message() {
        let err = ClientError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "Error: connection refused");
        assert_eq!(err.status(), None);
    }
}
