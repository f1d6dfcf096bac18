use crate::{
    domain::conversation::{ConversationKind, ConversationRow, MemberRole, NewConversation, NewMember},
    usecases::contracts::{BackendError, ConversationStore},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConversationCommand {
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateConversationError {
    Unauthorized,
    TemporarilyUnavailable,
    Rejected(String),
}

impl std::fmt::Display for CreateConversationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => f.write_str("not authorized to create conversations"),
            Self::TemporarilyUnavailable => f.write_str("backend temporarily unavailable"),
            Self::Rejected(details) => write!(f, "conversation rejected: {details}"),
        }
    }
}

impl std::error::Error for CreateConversationError {}

/// Inserts the conversation, the creator as owner and every other member.
pub fn create_conversation(
    store: &(impl ConversationStore + ?Sized),
    creator_id: &str,
    command: CreateConversationCommand,
) -> Result<ConversationRow, CreateConversationError> {
    let name = command
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty());

    let row = store
        .insert_conversation(&NewConversation {
            kind: command.kind,
            name,
            created_by: creator_id.to_owned(),
        })
        .map_err(map_source_error)?;

    store
        .insert_member(&NewMember {
            conversation_id: row.id.clone(),
            user_id: creator_id.to_owned(),
            role: MemberRole::Owner,
        })
        .map_err(map_source_error)?;

    for user_id in command.member_ids.iter().filter(|id| id.as_str() != creator_id) {
        store
            .insert_member(&NewMember {
                conversation_id: row.id.clone(),
                user_id: user_id.clone(),
                role: MemberRole::Member,
            })
            .map_err(map_source_error)?;
    }

    tracing::info!(
        conversation_id = %row.id,
        kind = row.kind.as_str(),
        members = command.member_ids.len() + 1,
        "conversation created"
    );

    Ok(row)
}

fn map_source_error(error: BackendError) -> CreateConversationError {
    match error {
        BackendError::Unauthorized => CreateConversationError::Unauthorized,
        BackendError::Unavailable(_) => CreateConversationError::TemporarilyUnavailable,
        other => CreateConversationError::Rejected(other.to_string()),
    }
}
