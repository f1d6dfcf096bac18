//! PostgREST-style table access for profiles, conversations, members,
//! messages and reactions.

use std::time::Duration;

use reqwest::{header::HeaderMap, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};

use crate::{
    domain::{
        conversation::{ConversationRow, MemberRow, NewConversation, NewMember},
        message::{MessageRow, NewMessage, NewReaction, ReactionRow},
        profile::{Profile, ProfileUpdate},
    },
    infra::{config::BackendConfig, error::AppError},
    usecases::contracts::{BackendError, ConversationStore, MessageStore, ProfileStore},
};

const REST_PREFIX: &str = "/rest/v1";
const UNIQUE_VIOLATION_CODE: &str = "23505";

const PROFILES: &str = "profiles";
const CONVERSATIONS: &str = "conversations";
const MEMBERS: &str = "conversation_members";
const MESSAGES: &str = "messages";
const REACTIONS: &str = "message_reactions";

const REST_REQUEST_FAILED: &str = "BACKEND_REST_REQUEST_FAILED";

/// Base URL plus the credentials sent with every request.
#[derive(Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
}

impl Endpoint {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_owned(),
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone().filter(|token| !token.is_empty()),
        }
    }

    /// Token for `Authorization: Bearer`; the anon key when signed out.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Blocking facade over the hosted backend. Owns the runtime every request,
/// realtime channel and function call runs on.
#[derive(Debug)]
pub struct RestBackend {
    pub(super) runtime: Runtime,
    pub(super) client: reqwest::Client,
    pub(super) endpoint: Endpoint,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("nova-backend")
            .enable_all()
            .build()
            .map_err(AppError::RuntimeInit)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClientInit)?;

        Ok(Self {
            runtime,
            client,
            endpoint: Endpoint::from_config(config),
        })
    }

    pub(super) fn authorized(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.endpoint.anon_key)
            .bearer_auth(self.endpoint.bearer())
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}{REST_PREFIX}/{table}", self.endpoint.base_url);
        self.authorized(method, &url)
    }

    fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .table(Method::GET, table)
            .query(&[("select", "*")])
            .query(query);

        self.runtime.block_on(async {
            let response = execute(table, request).await?;
            decode(table, response).await
        })
    }

    fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .table(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);

        self.runtime.block_on(async {
            let response = execute(table, request).await?;
            decode(table, response).await
        })
    }

    fn insert_silent<B: Serialize>(&self, table: &str, body: &B) -> Result<(), BackendError> {
        let request = self
            .table(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(body);

        self.runtime
            .block_on(async { execute(table, request).await.map(|_| ()) })
    }

    fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .table(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(query)
            .json(body);

        self.runtime.block_on(async {
            let response = execute(table, request).await?;
            decode(table, response).await
        })
    }

    /// Exact row count without transferring rows.
    fn count(&self, table: &str, query: &[(&str, String)]) -> Result<u32, BackendError> {
        let request = self
            .table(Method::HEAD, table)
            .header("Prefer", "count=exact")
            .query(&[("select", "id")])
            .query(query);

        self.runtime.block_on(async {
            let response = execute(table, request).await?;
            content_range_total(response.headers())
                .ok_or_else(|| BackendError::InvalidData(format!("{table}: missing row count")))
        })
    }
}

async fn execute(table: &str, request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().await.map_err(|error| {
        tracing::warn!(code = REST_REQUEST_FAILED, table, error = %error, "backend request failed");
        map_transport_error(&error)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(table, status = status.as_u16(), "backend returned an error status");
    Err(map_status(status, &body))
}

async fn decode<T: DeserializeOwned>(table: &str, response: Response) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|error| BackendError::InvalidData(format!("{table}: {error}")))
}

pub(super) fn map_transport_error(error: &reqwest::Error) -> BackendError {
    if error.is_timeout() || error.is_connect() {
        BackendError::Unavailable(error.to_string())
    } else if error.is_decode() {
        BackendError::InvalidData(error.to_string())
    } else {
        BackendError::Other(error.to_string())
    }
}

pub(super) fn map_status(status: StatusCode, body: &str) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized,
        StatusCode::NOT_FOUND => BackendError::NotFound,
        StatusCode::CONFLICT => BackendError::Duplicate,
        _ if is_unique_violation(body) => BackendError::Duplicate,
        status if status.is_server_error() => {
            BackendError::Unavailable(format!("status {}", status.as_u16()))
        }
        status => BackendError::Other(format!("status {}: {}", status.as_u16(), body.trim())),
    }
}

/// Error body returned by PostgREST, e.g. `{"code":"23505","message":"..."}`.
#[derive(Deserialize)]
struct PostgrestError {
    code: Option<String>,
}

fn is_unique_violation(body: &str) -> bool {
    serde_json::from_str::<PostgrestError>(body)
        .is_ok_and(|error| error.code.as_deref() == Some(UNIQUE_VIOLATION_CODE))
}

/// Total from a `Content-Range` header such as `0-24/310` or `*/0`.
pub(super) fn content_range_total(headers: &HeaderMap) -> Option<u32> {
    let value = headers.get("content-range")?.to_str().ok()?;
    parse_content_range_total(value)
}

fn parse_content_range_total(value: &str) -> Option<u32> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// `in.(a,b)` filter; values with reserved characters are double-quoted.
fn in_filter(values: &[String]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|value| {
            if value.chars().any(|ch| matches!(ch, ',' | '(' | ')' | '"' | ':' | ' ')) {
                format!("\"{}\"", value.replace('"', "\\\""))
            } else {
                value.clone()
            }
        })
        .collect();
    format!("in.({})", items.join(","))
}

fn first<T>(table: &str, rows: Vec<T>) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidData(format!("{table}: empty representation")))
}

impl ProfileStore for RestBackend {
    fn profiles_by_ids(&self, user_ids: &[String]) -> Result<Vec<Profile>, BackendError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(PROFILES, &[("id", in_filter(user_ids))])
    }

    fn profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let rows: Vec<Profile> = self.select(PROFILES, &[("id", eq(user_id))])?;
        Ok(rows.into_iter().next())
    }

    fn all_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        self.select(PROFILES, &[])
    }

    fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile, BackendError> {
        let rows: Vec<Profile> = self.update(PROFILES, &[("id", eq(user_id))], update)?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }
}

impl ConversationStore for RestBackend {
    fn memberships_for_user(&self, user_id: &str) -> Result<Vec<MemberRow>, BackendError> {
        self.select(MEMBERS, &[("user_id", eq(user_id))])
    }

    fn conversations_by_ids(
        &self,
        conversation_ids: &[String],
    ) -> Result<Vec<ConversationRow>, BackendError> {
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(CONVERSATIONS, &[("id", in_filter(conversation_ids))])
    }

    fn members_for_conversations(
        &self,
        conversation_ids: &[String],
    ) -> Result<Vec<MemberRow>, BackendError> {
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(MEMBERS, &[("conversation_id", in_filter(conversation_ids))])
    }

    fn insert_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<ConversationRow, BackendError> {
        let rows = self.insert(CONVERSATIONS, conversation)?;
        first(CONVERSATIONS, rows)
    }

    fn insert_member(&self, member: &NewMember) -> Result<(), BackendError> {
        self.insert_silent(MEMBERS, member)
    }
}

impl MessageStore for RestBackend {
    fn latest_message(&self, conversation_id: &str) -> Result<Option<MessageRow>, BackendError> {
        let rows: Vec<MessageRow> = self.select(
            MESSAGES,
            &[
                ("conversation_id", eq(conversation_id)),
                ("order", "created_at.desc".to_owned()),
                ("limit", "1".to_owned()),
            ],
        )?;
        Ok(rows.into_iter().next())
    }

    fn unread_count(&self, conversation_id: &str, viewer_id: &str) -> Result<u32, BackendError> {
        self.count(
            MESSAGES,
            &[
                ("conversation_id", eq(conversation_id)),
                ("sender_id", format!("neq.{viewer_id}")),
                ("is_read", "eq.false".to_owned()),
            ],
        )
    }

    fn messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>, BackendError> {
        self.select(
            MESSAGES,
            &[
                ("conversation_id", eq(conversation_id)),
                ("order", "created_at.asc".to_owned()),
            ],
        )
    }

    fn insert_message(&self, message: &NewMessage) -> Result<MessageRow, BackendError> {
        let rows = self.insert(MESSAGES, message)?;
        first(MESSAGES, rows)
    }

    fn reactions_for(&self, message_ids: &[String]) -> Result<Vec<ReactionRow>, BackendError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(REACTIONS, &[("message_id", in_filter(message_ids))])
    }

    fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), BackendError> {
        self.insert_silent(REACTIONS, reaction)
    }

    fn set_bookmarked(&self, message_id: &str, bookmarked: bool) -> Result<(), BackendError> {
        let rows: Vec<MessageRow> = self.update(
            MESSAGES,
            &[("id", eq(message_id))],
            &serde_json::json!({ "is_bookmarked": bookmarked }),
        )?;
        if rows.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}
