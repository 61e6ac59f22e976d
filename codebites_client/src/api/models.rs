use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub admin: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    pub body: String,
    pub test_code: String,
    pub test_solution: String,
    pub difficulty: String,
}

/// Every read endpoint wraps its payload as `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserList {
    pub(crate) users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionList {
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) token: String,
}

/// Shape of the service's failure bodies, e.g.
/// `{"status": "fail", "message": "User already exists"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FailResponse {
    pub(crate) message: String,
}
