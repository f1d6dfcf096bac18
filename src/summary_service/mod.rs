//! HTTP service behind `POST /functions/v1/ai-summary`.
//!
//! Formats the conversation for the completion gateway and translates
//! gateway failures into the status codes and error bodies clients expect.

pub mod completion;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    domain::summary::{
        SummaryRequest, SummaryResponse, CREDITS_DEPLETED_NOTICE, RATE_LIMITED_NOTICE,
    },
    infra::config::SummaryServiceConfig,
};

use self::completion::{ChatMessage, CompletionApi, CompletionRequest};

pub const SUMMARY_ROUTE: &str = "/functions/v1/ai-summary";
const CONTEXT_MESSAGE_LIMIT: usize = 50;
const NO_MESSAGES_CONTEXT: &str = "No messages available";
const MISSING_COMPLETION: &str = "Unable to generate summary.";

const SYSTEM_PROMPT: &str = "You are an AI assistant that creates concise, actionable summaries of chat conversations.
Your summaries should:
- Highlight key discussion points
- Extract action items if any
- Note important decisions made
- Be formatted with bullet points for easy scanning
- Be professional yet conversational

Format your response with clear sections:
**Key Discussion Points:**
• Point 1
• Point 2

**Decisions Made:** (if any)
• Decision 1

**Action Items:** (if any)
1. Action 1
2. Action 2

Keep the summary concise but comprehensive.";

const SUMMARY_REQUEST_FAILED: &str = "SUMMARY_REQUEST_FAILED";
const SUMMARY_SERVICE_LISTENING: &str = "SUMMARY_SERVICE_LISTENING";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryServiceError {
    #[error("{0}")]
    MalformedRequest(String),
    #[error("{env} is not configured")]
    MissingApiKey { env: String },
    #[error("{}", RATE_LIMITED_NOTICE)]
    RateLimited,
    #[error("{}", CREDITS_DEPLETED_NOTICE)]
    CreditsDepleted,
    #[error("AI gateway error: {status}")]
    Upstream { status: u16 },
    #[error("AI gateway unreachable: {0}")]
    Transport(String),
}

impl SummaryServiceError {
    fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::CreditsDepleted => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SummaryServiceError {
    fn into_response(self) -> Response {
        let body = SummaryResponse {
            summary: None,
            error: Some(self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub struct ServiceState<C> {
    completion: C,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl<C: CompletionApi> ServiceState<C> {
    pub fn new(completion: C, config: &SummaryServiceConfig, api_key: Option<String>) -> Self {
        Self {
            completion,
            model: config.model.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Reads the gateway key from the environment variable named in config.
    pub fn from_env(completion: C, config: &SummaryServiceConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "gateway API key is not set; summary requests will fail"
            );
        }
        Self::new(completion, config, api_key)
    }
}

pub fn router<C: CompletionApi>(state: ServiceState<C>) -> Router {
    Router::new()
        .route(SUMMARY_ROUTE, post(summarize::<C>))
        .with_state(Arc::new(state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

pub async fn serve<C: CompletionApi>(
    config: &SummaryServiceConfig,
    state: ServiceState<C>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(code = SUMMARY_SERVICE_LISTENING, %addr, "summary service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn summarize<C: CompletionApi>(
    State(state): State<Arc<ServiceState<C>>>,
    body: Bytes,
) -> Response {
    match generate(&state, &body).await {
        Ok(summary) => Json(SummaryResponse {
            summary: Some(summary),
            error: None,
        })
        .into_response(),
        Err(error) => {
            tracing::error!(
                code = SUMMARY_REQUEST_FAILED,
                status = error.status().as_u16(),
                error = %error,
                "summary request failed"
            );
            error.into_response()
        }
    }
}

async fn generate<C: CompletionApi>(
    state: &ServiceState<C>,
    body: &[u8],
) -> Result<String, SummaryServiceError> {
    let request: SummaryRequest = serde_json::from_slice(body)
        .map_err(|error| SummaryServiceError::MalformedRequest(error.to_string()))?;

    tracing::info!(
        conversation = %request.conversation_name,
        messages = request.messages.as_ref().map_or(0, Vec::len),
        "generating summary"
    );

    let api_key = state
        .api_key
        .as_deref()
        .ok_or_else(|| SummaryServiceError::MissingApiKey {
            env: state.api_key_env.clone(),
        })?;

    let completion = state
        .completion
        .complete(api_key, &completion_request(&state.model, &request))
        .await?;

    Ok(completion.unwrap_or_else(|| MISSING_COMPLETION.to_owned()))
}

/// The last messages as `[sender]: content` lines.
fn message_context(request: &SummaryRequest) -> String {
    let messages = request.messages.as_deref().unwrap_or_default();
    let start = messages.len().saturating_sub(CONTEXT_MESSAGE_LIMIT);
    let context = messages[start..]
        .iter()
        .map(|message| format!("[{}]: {}", message.sender_name, message.content))
        .collect::<Vec<_>>()
        .join("\n");

    if context.is_empty() {
        NO_MESSAGES_CONTEXT.to_owned()
    } else {
        context
    }
}

fn completion_request(model: &str, request: &SummaryRequest) -> CompletionRequest {
    CompletionRequest {
        model: model.to_owned(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_owned(),
            },
            ChatMessage {
                role: "user",
                content: format!(
                    "Please summarize this conversation from \"{}\":\n\n{}",
                    request.conversation_name,
                    message_context(request)
                ),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::{future::Future, sync::Mutex};

    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::{domain::summary::SummaryMessage, test_support::env_lock};

    struct FakeCompletion {
        reply: Result<Option<String>, SummaryServiceError>,
        captured: Arc<Mutex<Option<(String, CompletionRequest)>>>,
    }

    impl FakeCompletion {
        fn replying(reply: Result<Option<String>, SummaryServiceError>) -> Self {
            Self {
                reply,
                captured: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl CompletionApi for FakeCompletion {
        fn complete(
            &self,
            api_key: &str,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<Option<String>, SummaryServiceError>> + Send {
            *self.captured.lock().expect("capture lock") = Some((api_key.to_owned(), request.clone()));
            let reply = self.reply.clone();
            async move { reply }
        }
    }

    fn state(completion: FakeCompletion, api_key: Option<&str>) -> ServiceState<FakeCompletion> {
        ServiceState::new(
            completion,
            &SummaryServiceConfig::default(),
            api_key.map(ToOwned::to_owned),
        )
    }

    fn summary_request(count: usize) -> String {
        let messages: Vec<SummaryMessage> = (0..count)
            .map(|i| SummaryMessage {
                sender_name: format!("user{i}"),
                content: format!("line {i}"),
                created_at: "2026-01-01T00:00:00Z".to_owned(),
            })
            .collect();
        serde_json::to_string(&SummaryRequest {
            messages: Some(messages),
            conversation_name: "Design Team".to_owned(),
        })
        .expect("request serializes")
    }

    async fn post(app: Router, body: String) -> (StatusCode, SummaryResponse) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(SUMMARY_ROUTE)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    #[tokio::test]
    async fn returns_summary_from_gateway() {
        let fake = FakeCompletion::replying(Ok(Some("**Key Discussion Points:**".to_owned())));
        let captured = Arc::clone(&fake.captured);

        let (status, body) = post(router(state(fake, Some("key-1"))), summary_request(2)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.summary.as_deref(), Some("**Key Discussion Points:**"));
        let (api_key, request) = captured.lock().expect("capture lock").clone().expect("called");
        assert_eq!(api_key, "key-1");
        assert_eq!(request.model, "google/gemini-2.5-flash");
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(
            request.messages[1].content,
            "Please summarize this conversation from \"Design Team\":\n\n[user0]: line 0\n[user1]: line 1"
        );
    }

    #[tokio::test]
    async fn forwards_only_the_last_fifty_messages() {
        let fake = FakeCompletion::replying(Ok(Some("ok".to_owned())));
        let captured = Arc::clone(&fake.captured);

        let (status, _) = post(router(state(fake, Some("key"))), summary_request(60)).await;

        assert_eq!(status, StatusCode::OK);
        let (_, request) = captured.lock().expect("capture lock").clone().expect("called");
        let user_prompt = &request.messages[1].content;
        assert!(user_prompt.contains("[user10]: line 10"));
        assert!(!user_prompt.contains("[user9]: line 9\n"));
        assert_eq!(user_prompt.matches("\n[user").count(), 50);
    }

    #[tokio::test]
    async fn empty_conversation_uses_placeholder_context() {
        let fake = FakeCompletion::replying(Ok(None));
        let captured = Arc::clone(&fake.captured);

        let (status, body) = post(router(state(fake, Some("key"))), summary_request(0)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.summary.as_deref(), Some("Unable to generate summary."));
        let (_, request) = captured.lock().expect("capture lock").clone().expect("called");
        assert!(request.messages[1].content.ends_with("No messages available"));
    }

    #[tokio::test]
    async fn gateway_rate_limit_maps_to_429() {
        let fake = FakeCompletion::replying(Err(SummaryServiceError::RateLimited));

        let (status, body) = post(router(state(fake, Some("key"))), summary_request(1)).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.error.as_deref(), Some("Rate limits exceeded, please try again later."));
    }

    #[tokio::test]
    async fn gateway_payment_required_maps_to_402() {
        let fake = FakeCompletion::replying(Err(SummaryServiceError::CreditsDepleted));

        let (status, body) = post(router(state(fake, Some("key"))), summary_request(1)).await;

        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body.error.as_deref(), Some(CREDITS_DEPLETED_NOTICE));
    }

    #[tokio::test]
    async fn other_gateway_failures_map_to_500() {
        let fake = FakeCompletion::replying(Err(SummaryServiceError::Upstream { status: 503 }));

        let (status, body) = post(router(state(fake, Some("key"))), summary_request(1)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.as_deref(), Some("AI gateway error: 503"));
    }

    #[tokio::test]
    async fn missing_api_key_maps_to_500_without_gateway_call() {
        let fake = FakeCompletion::replying(Ok(Some("unused".to_owned())));
        let captured = Arc::clone(&fake.captured);

        let (status, body) = post(router(state(fake, None)), summary_request(1)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.as_deref(), Some("LOVABLE_API_KEY is not configured"));
        assert!(captured.lock().expect("capture lock").is_none());
    }

    #[tokio::test]
    async fn malformed_body_maps_to_500() {
        let fake = FakeCompletion::replying(Ok(Some("unused".to_owned())));

        let (status, body) = post(router(state(fake, Some("key"))), "{not json".to_owned()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.is_some());
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let fake = FakeCompletion::replying(Ok(None));
        let app = router(state(fake, Some("key")));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(SUMMARY_ROUTE)
                    .header("origin", "https://app.example.com")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "apikey, content-type")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
        let allowed = response
            .headers()
            .get("access-control-allow-headers")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("x-client-info"));
        assert!(allowed.contains("apikey"));
    }

    #[test]
    fn reads_api_key_from_configured_env_var() {
        let _guard = env_lock();
        let config = SummaryServiceConfig {
            api_key_env: "NOVA_TEST_GATEWAY_KEY".to_owned(),
            ..SummaryServiceConfig::default()
        };

        // SAFETY: env is guarded by process-wide test mutex.
        unsafe { std::env::set_var("NOVA_TEST_GATEWAY_KEY", "from-env") };
        let with_key = ServiceState::from_env(FakeCompletion::replying(Ok(None)), &config);
        // SAFETY: env is guarded by process-wide test mutex.
        unsafe { std::env::remove_var("NOVA_TEST_GATEWAY_KEY") };
        let without_key = ServiceState::from_env(FakeCompletion::replying(Ok(None)), &config);

        assert_eq!(with_key.api_key.as_deref(), Some("from-env"));
        assert_eq!(without_key.api_key, None);
    }
}
