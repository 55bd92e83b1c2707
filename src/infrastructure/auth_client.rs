use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct PasswordSignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RefreshSessionRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthHttpClient: Send + Sync {
    async fn sign_in_with_password(
        &self,
        request: PasswordSignInRequest,
    ) -> Result<AuthTokenResponse, InfraError>;

    async fn sign_up(&self, request: SignUpRequest) -> Result<(), InfraError>;

    async fn refresh_session(
        &self,
        request: RefreshSessionRequest,
    ) -> Result<AuthTokenResponse, InfraError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, serde::Serialize)]
struct CredentialsPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct RefreshPayload<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct SessionPayload {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<UserPayload>,
}

#[derive(Debug, serde::Deserialize)]
struct UserPayload {
    id: Option<String>,
    email: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct AuthErrorPayload {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl ReqwestAuthClient {
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| InfraError::Auth(format!("failed to build http client: {error}")))?;
        Ok(Self {
            client,
            base_url: config.project_url.clone(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, segment: &str) -> Result<Url, InfraError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|error| InfraError::Auth(format!("invalid project url: {error}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| InfraError::Auth("project URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            segments.push("auth");
            segments.push("v1");
            segments.push(segment);
        }
        Ok(url)
    }

    fn auth_http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        if let Ok(parsed) = serde_json::from_str::<AuthErrorPayload>(body) {
            let message = parsed
                .msg
                .or(parsed.message)
                .or(parsed.error_description)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            if let Some(message) = message {
                return InfraError::Auth(message);
            }
        }
        if body.trim().is_empty() {
            InfraError::Auth(format!("auth api error: http {}", status.as_u16()))
        } else {
            InfraError::Auth(format!("auth api error: http {}; body={body}", status.as_u16()))
        }
    }

    async fn request_session(
        &self,
        url: Url,
        body: serde_json::Value,
        stage: &str,
    ) -> Result<AuthTokenResponse, InfraError> {
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| InfraError::Auth(format!("network error while {stage}: {error}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|error| InfraError::Auth(format!("failed reading {stage} response: {error}")))?;

        if !status.is_success() {
            return Err(Self::auth_http_error(status, &raw));
        }

        let parsed: SessionPayload = serde_json::from_str(&raw).map_err(|error| {
            InfraError::Auth(format!("invalid {stage} payload: {error}; body={raw}"))
        })?;

        let (user_id, email) = match parsed.user {
            Some(user) => (user.id, user.email),
            None => (None, None),
        };

        Ok(AuthTokenResponse {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_in: parsed.expires_in.unwrap_or(0).max(0),
            user_id,
            email,
        })
    }
}

#[async_trait]
impl AuthHttpClient for ReqwestAuthClient {
    async fn sign_in_with_password(
        &self,
        request: PasswordSignInRequest,
    ) -> Result<AuthTokenResponse, InfraError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = serde_json::to_value(CredentialsPayload {
            email: &request.email,
            password: &request.password,
        })?;
        self.request_session(url, body, "signing in").await
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<(), InfraError> {
        let url = self.endpoint("signup")?;
        let body = CredentialsPayload {
            email: &request.email,
            password: &request.password,
        };

        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| InfraError::Auth(format!("network error while signing up: {error}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|error| InfraError::Auth(format!("failed reading sign-up response: {error}")))?;

        if !status.is_success() {
            return Err(Self::auth_http_error(status, &raw));
        }
        Ok(())
    }

    async fn refresh_session(
        &self,
        request: RefreshSessionRequest,
    ) -> Result<AuthTokenResponse, InfraError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");
        let body = serde_json::to_value(RefreshPayload {
            refresh_token: &request.refresh_token,
        })?;
        self.request_session(url, body, "refreshing the session").await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), InfraError> {
        let url = self.endpoint("logout")?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| InfraError::Auth(format!("network error while signing out: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(Self::auth_http_error(status, &raw));
        }
        Ok(())
    }
}
