use crate::form::{CredentialPayload, FormKind};
use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub use http::HttpUsersApi;
pub use models::{Question, User};

mod http;
mod models;

#[derive(Debug)]
pub enum ApiError {
    /// The service answered with a non-2xx status, e.g. bad credentials or a
    /// duplicate user.
    Rejected { status: u16, message: String },
    Transport(reqwest::Error),
    Decode(serde_json::Error),
}

impl ApiError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            ApiError::Rejected {
                status,
                ref message,
            } => write!(f, "request rejected with status {}: {}", status, message),
            ApiError::Transport(ref e) => write!(f, "error talking to the users service: {}", e),
            ApiError::Decode(ref e) => write!(f, "error decoding response: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// The remote users/questions service.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// `POST /login/{register|login}`; yields the session token.
    async fn exchange(
        &self,
        kind: FormKind,
        payload: &CredentialPayload,
    ) -> Result<String, ApiError>;

    async fn users(&self, token: Option<&str>) -> Result<Vec<User>, ApiError>;

    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn questions(&self, token: &str) -> Result<Vec<Question>, ApiError>;

    async fn signout(&self, token: &str) -> Result<(), ApiError>;
}
