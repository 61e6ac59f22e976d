use super::{
    models::{Envelope, FailResponse, QuestionList, TokenResponse, UserList},
    ApiError, Question, User, UsersApi,
};
use crate::form::{CredentialPayload, FormKind};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{instrument, trace};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpUsersApi {
    client: Client,
    base_url: String,
}

impl HttpUsersApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self
            .client
            .get(&self.url(path))
            .header(header::CONTENT_TYPE, "application/json");
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(status = status.as_u16(), "response body: {}", body);

        if !status.is_success() {
            // Fall back to the status text when the body isn't the usual
            // `{"status": "fail", "message": ...}`.
            let message = serde_json::from_str::<FailResponse>(&body)
                .map(|fail| fail.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_owned());
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    #[instrument(skip(self, payload))]
    async fn exchange(
        &self,
        kind: FormKind,
        payload: &CredentialPayload,
    ) -> Result<String, ApiError> {
        let request = self
            .client
            .post(&self.url(&format!("/login/{}", kind.endpoint())))
            .json(payload);
        let response: TokenResponse = self.send(request).await?;
        Ok(response.token)
    }

    #[instrument(skip(self, token))]
    async fn users(&self, token: Option<&str>) -> Result<Vec<User>, ApiError> {
        let envelope: Envelope<UserList> = self.send(self.get("/users", token)).await?;
        Ok(envelope.data.users)
    }

    #[instrument(skip(self, token))]
    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self.send(self.get("/login/me", Some(token))).await?;
        Ok(envelope.data)
    }

    #[instrument(skip(self, token))]
    async fn questions(&self, token: &str) -> Result<Vec<Question>, ApiError> {
        let envelope: Envelope<QuestionList> =
            self.send(self.get("/questions", Some(token))).await?;
        Ok(envelope.data.questions)
    }

    #[instrument(skip(self, token))]
    async fn signout(&self, token: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.send(self.get("/login/signout", Some(token))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let api = HttpUsersApi::with_client(Client::new(), "http://localhost:5001/");
        assert_eq!(api.base_url(), "http://localhost:5001");
        assert_eq!(api.url("/login/login"), "http://localhost:5001/login/login");
    }
}
