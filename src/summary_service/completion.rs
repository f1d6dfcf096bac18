//! Client for the OpenAI-compatible chat completion gateway.

use std::{future::Future, time::Duration};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::summary_service::SummaryServiceError;

const GATEWAY_REQUEST_FAILED: &str = "SUMMARY_GATEWAY_REQUEST_FAILED";
const GATEWAY_ERROR_STATUS: &str = "SUMMARY_GATEWAY_ERROR_STATUS";

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub trait CompletionApi: Send + Sync + 'static {
    /// First choice's text, `None` when the gateway produced nothing.
    fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Option<String>, SummaryServiceError>> + Send;
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl CompletionApi for GatewayClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, SummaryServiceError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|error| {
                tracing::error!(code = GATEWAY_REQUEST_FAILED, error = %error, "gateway request failed");
                SummaryServiceError::Transport(error.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                code = GATEWAY_ERROR_STATUS,
                status = status.as_u16(),
                body = %body,
                "gateway returned an error status"
            );
            return Err(classify_status(status));
        }

        let body: CompletionBody = response
            .json()
            .await
            .map_err(|error| SummaryServiceError::Transport(error.to_string()))?;

        Ok(first_content(body))
    }
}

fn classify_status(status: StatusCode) -> SummaryServiceError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => SummaryServiceError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => SummaryServiceError::CreditsDepleted,
        status => SummaryServiceError::Upstream {
            status: status.as_u16(),
        },
    }
}

fn first_content(body: CompletionBody) -> Option<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
}
