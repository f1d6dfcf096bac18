use crate::{
    domain::{
        message::Message,
        summary::{
            parse_summary, SummaryBlock, SummaryMessage, SummaryRequest, CREDITS_DEPLETED_NOTICE,
            EMPTY_SUMMARY_BODY, FALLBACK_SENDER_NAME, GENERIC_FAILURE_NOTICE, RATE_LIMITED_NOTICE,
            UNAVAILABLE_BODY,
        },
    },
    usecases::contracts::{InvokeResponse, SummaryInvoker},
};

const SUMMARY_INVOKE_FAILED: &str = "SUMMARY_INVOKE_FAILED";
const SUMMARY_REJECTED: &str = "SUMMARY_REJECTED";

/// What the summary panel shows: an optional notice plus body blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub notice: Option<String>,
    pub blocks: Vec<SummaryBlock>,
}

impl SummaryView {
    fn failed(notice: impl Into<String>) -> Self {
        Self {
            notice: Some(notice.into()),
            blocks: vec![SummaryBlock::Paragraph(UNAVAILABLE_BODY.to_owned())],
        }
    }

    pub fn is_failure(&self) -> bool {
        self.notice.is_some()
    }
}

/// Packages the newest `max_messages` messages, oldest first.
pub fn build_request(
    messages: &[Message],
    conversation_name: &str,
    max_messages: usize,
) -> SummaryRequest {
    let start = messages.len().saturating_sub(max_messages);
    let packaged = messages[start..]
        .iter()
        .map(|message| SummaryMessage {
            sender_name: message
                .sender
                .as_ref()
                .and_then(|profile| profile.label())
                .unwrap_or(FALLBACK_SENDER_NAME)
                .to_owned(),
            content: message.content.clone(),
            created_at: message.created_at.to_rfc3339(),
        })
        .collect();

    SummaryRequest {
        messages: Some(packaged),
        conversation_name: conversation_name.to_owned(),
    }
}

pub fn summarize(
    invoker: &(impl SummaryInvoker + ?Sized),
    function_name: &str,
    request: &SummaryRequest,
) -> SummaryView {
    match invoker.invoke_summary(function_name, request) {
        Ok(response) => interpret(response),
        Err(error) => {
            tracing::warn!(
                code = SUMMARY_INVOKE_FAILED,
                function_name,
                error = %error,
                "summary function call failed"
            );
            SummaryView::failed(GENERIC_FAILURE_NOTICE)
        }
    }
}

fn interpret(response: InvokeResponse) -> SummaryView {
    match response.status {
        429 => return reject(response.status, RATE_LIMITED_NOTICE),
        402 => return reject(response.status, CREDITS_DEPLETED_NOTICE),
        200..=299 => {}
        status => return reject(status, GENERIC_FAILURE_NOTICE),
    }

    let body = response.body.unwrap_or_default();
    if let Some(error) = body.error {
        return reject(response.status, error);
    }

    let blocks = body
        .summary
        .as_deref()
        .map(parse_summary)
        .filter(|blocks| !blocks.is_empty())
        .unwrap_or_else(|| vec![SummaryBlock::Paragraph(EMPTY_SUMMARY_BODY.to_owned())]);

    SummaryView {
        notice: None,
        blocks,
    }
}

fn reject(status: u16, notice: impl Into<String>) -> SummaryView {
    let view = SummaryView::failed(notice);
    tracing::warn!(
        code = SUMMARY_REJECTED,
        status,
        notice = view.notice.as_deref().unwrap_or_default(),
        "summary function returned an error"
    );
    view
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        domain::{message::MessageRow, profile::Profile, summary::SummaryResponse},
        usecases::contracts::BackendError,
    };

    struct StubInvoker {
        result: Result<InvokeResponse, BackendError>,
        captured: RefCell<Option<(String, SummaryRequest)>>,
    }

    impl StubInvoker {
        fn with_result(result: Result<InvokeResponse, BackendError>) -> Self {
            Self {
                result,
                captured: RefCell::new(None),
            }
        }

        fn status(status: u16, body: Option<SummaryResponse>) -> Self {
            Self::with_result(Ok(InvokeResponse { status, body }))
        }
    }

    impl SummaryInvoker for StubInvoker {
        fn invoke_summary(
            &self,
            function_name: &str,
            request: &SummaryRequest,
        ) -> Result<InvokeResponse, BackendError> {
            *self.captured.borrow_mut() = Some((function_name.to_owned(), request.clone()));
            self.result.clone()
        }
    }

    fn message(index: i64, sender: Option<&str>) -> Message {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid time");
        let row = MessageRow {
            id: format!("m{index}"),
            conversation_id: "c1".to_owned(),
            sender_id: "u1".to_owned(),
            content: format!("message {index}"),
            reply_to: None,
            is_read: true,
            is_bookmarked: false,
            self_destruct_seconds: None,
            created_at: base + Duration::minutes(index),
        };
        let profile = sender.map(|name| {
            let mut profile = Profile::new("u1");
            profile.display_name = Some(name.to_owned());
            profile
        });
        Message::from_row(row, profile, Vec::new())
    }

    fn request() -> SummaryRequest {
        build_request(&[message(1, Some("Alex"))], "Design", 50)
    }

    #[test]
    fn keeps_only_the_newest_messages() {
        let messages: Vec<Message> = (0..60).map(|i| message(i, Some("Alex"))).collect();

        let request = build_request(&messages, "Design", 50);
        let packaged = request.messages.expect("messages");

        assert_eq!(packaged.len(), 50);
        assert_eq!(packaged[0].content, "message 10");
        assert_eq!(packaged[49].content, "message 59");
        assert_eq!(request.conversation_name, "Design");
    }

    #[test]
    fn unresolved_sender_is_labelled_user() {
        let request = build_request(&[message(1, None)], "Design", 50);

        assert_eq!(request.messages.expect("messages")[0].sender_name, "User");
    }

    #[test]
    fn parses_successful_summary_into_blocks() {
        let invoker = StubInvoker::status(
            200,
            Some(SummaryResponse {
                summary: Some("**Key Discussion Points**\n• specs shared\n\n1. review".to_owned()),
                error: None,
            }),
        );

        let view = summarize(&invoker, "ai-summary", &request());

        assert_eq!(view.notice, None);
        assert_eq!(
            view.blocks,
            vec![
                SummaryBlock::Heading("Key Discussion Points".to_owned()),
                SummaryBlock::Bullet("• specs shared".to_owned()),
                SummaryBlock::Numbered("1. review".to_owned()),
            ]
        );
        let captured = invoker.captured.borrow();
        assert_eq!(captured.as_ref().map(|(name, _)| name.as_str()), Some("ai-summary"));
    }

    #[test]
    fn missing_summary_shows_placeholder() {
        let invoker = StubInvoker::status(200, Some(SummaryResponse::default()));

        let view = summarize(&invoker, "ai-summary", &request());

        assert_eq!(view.notice, None);
        assert_eq!(view.blocks, vec![SummaryBlock::Paragraph(EMPTY_SUMMARY_BODY.to_owned())]);
    }

    #[test]
    fn maps_rate_limit_status_to_rate_limit_notice() {
        let invoker = StubInvoker::status(429, None);

        let view = summarize(&invoker, "ai-summary", &request());

        assert_eq!(view.notice.as_deref(), Some("Rate limits exceeded, please try again later."));
        assert_eq!(view.blocks, vec![SummaryBlock::Paragraph(UNAVAILABLE_BODY.to_owned())]);
    }

    #[test]
    fn maps_payment_required_to_credits_notice() {
        let invoker = StubInvoker::status(402, None);

        let view = summarize(&invoker, "ai-summary", &request());

        assert_eq!(view.notice.as_deref(), Some(CREDITS_DEPLETED_NOTICE));
    }

    #[test]
    fn surfaces_error_body_text() {
        let invoker = StubInvoker::status(
            200,
            Some(SummaryResponse {
                summary: None,
                error: Some("LOVABLE_API_KEY is not configured".to_owned()),
            }),
        );

        let view = summarize(&invoker, "ai-summary", &request());

        assert_eq!(view.notice.as_deref(), Some("LOVABLE_API_KEY is not configured"));
        assert!(view.is_failure());
    }

    #[test]
    fn maps_other_failures_to_generic_notice() {
        let server_error = StubInvoker::status(500, None);
        let transport = StubInvoker::with_result(Err(BackendError::Unavailable("reset".into())));

        assert_eq!(
            summarize(&server_error, "ai-summary", &request()).notice.as_deref(),
            Some(GENERIC_FAILURE_NOTICE)
        );
        assert_eq!(
            summarize(&transport, "ai-summary", &request()).notice.as_deref(),
            Some(GENERIC_FAILURE_NOTICE)
        );
    }
}
