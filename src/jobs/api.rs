use crate::config::{AuthKind, JobsConfig};
use crate::jobs::{JobError, JobHandle};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Environment variable overriding the configured API token
pub const TOKEN_ENV_VAR: &str = "SEO_LENS_API_TOKEN";

/// Remote job endpoints
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submits a job definition and returns the creation response
    async fn submit(&self, request: &Value) -> Result<JobHandle, JobError>;

    /// Fetches the current state of a job
    async fn status(&self, job_id: &str) -> Result<JobHandle, JobError>;
}

/// [`JobApi`] over HTTP: `POST {base}/jobs`, `GET {base}/jobs/{id}`
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: Client,
    base_url: String,
    auth: AuthKind,
    auth_header: String,
    token: String,
}

impl HttpJobApi {
    pub fn new(client: Client, base_url: &str, auth: AuthKind, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            auth_header: "X-Api-Token".to_string(),
            token: token.into(),
        }
    }

    /// Builds the client from configuration; [`TOKEN_ENV_VAR`] wins over `[jobs] token`
    pub fn from_config(client: Client, config: &JobsConfig) -> Result<Self, JobError> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| config.token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or(JobError::MissingToken)?;

        let mut api = Self::new(client, &config.api_base_url, config.auth, token.trim());
        api.auth_header = config.auth_header.clone();
        Ok(api)
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth {
            AuthKind::Token => request.header(AUTHORIZATION, format!("Token {}", self.token)),
            AuthKind::Bearer => request.bearer_auth(&self.token),
            AuthKind::Header => request.header(self.auth_header.as_str(), self.token.as_str()),
        }
    }
}

/// Reads a JSON body, turning non-JSON or non-2xx answers into errors
async fn read_json(response: Response) -> Result<Value, JobError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(JobError::Http {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| JobError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn submit(&self, request: &Value) -> Result<JobHandle, JobError> {
        let url = self.jobs_url();
        tracing::info!("Submitting job to {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let payload = match read_json(response).await {
            Ok(payload) => payload,
            Err(JobError::Http { status, body }) => {
                return Err(JobError::Submit {
                    status: format!("HTTP {}", status),
                    payload: body,
                })
            }
            Err(e) => return Err(e),
        };
        JobHandle::from_payload(payload)
    }

    async fn status(&self, job_id: &str) -> Result<JobHandle, JobError> {
        let url = format!("{}/{}", self.jobs_url(), job_id);
        tracing::debug!("Checking job status at {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        let mut handle = JobHandle::from_payload(read_json(response).await?)?;
        if handle.job_id.is_none() {
            handle.job_id = Some(job_id.to_string());
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpJobApi::new(Client::new(), "https://api.example.com/v1/", AuthKind::Token, "t");
        assert_eq!(api.jobs_url(), "https://api.example.com/v1/jobs");
    }

    #[test]
    fn test_from_config_requires_token() {
        if std::env::var(TOKEN_ENV_VAR).is_ok() {
            return;
        }
        let config = JobsConfig::default();
        assert!(matches!(
            HttpJobApi::from_config(Client::new(), &config),
            Err(JobError::MissingToken)
        ));

        let config = JobsConfig {
            token: Some("secret".to_string()),
            auth: AuthKind::Header,
            auth_header: "X-Custom".to_string(),
            ..JobsConfig::default()
        };
        let api = HttpJobApi::from_config(Client::new(), &config).unwrap();
        assert_eq!(api.token, "secret");
        assert_eq!(api.auth_header, "X-Custom");
    }
}
