use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use super::{FileTokenStore, StoredSession};
use crate::errors::{ClientError, Result};
use crate::http::HttpClient;

const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Enter a valid e-mail"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login answer. Older backends send `accessToken`, newer ones `token`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}

/// Login/logout against the backend, persisting the token.
#[derive(Clone)]
pub struct AuthApi {
    http: Arc<HttpClient>,
}

impl AuthApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        let response: LoginResponse = self.http.post(LOGIN_PATH, &credentials).await?;
        if response.token.trim().is_empty() {
            return Err(ClientError::Session("backend returned an empty token".into()));
        }
        self.http.tokens().save(&response.token)?;
        info!("logged in");
        Ok(response)
    }

    /// Same as [`login`](Self::login), recording the e-mail in the session
    /// file so `status` can show who is logged in.
    pub async fn login_to_file(
        &self,
        store: &FileTokenStore,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse> {
        let response = self.login(email, password).await?;
        store.save_session(&StoredSession {
            token: response.token.clone(),
            email: Some(email.trim().to_string()),
            saved_at: Utc::now(),
        })?;
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.http.tokens().clear()?;
        info!("logged out");
        Ok(())
    }

    pub fn current_token(&self) -> Result<Option<String>> {
        self.http.tokens().load()
    }
}
