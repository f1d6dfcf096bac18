//! Builds the sidebar view of every conversation the signed-in user belongs to.
//!
//! A failed membership, conversation or member fetch is reported to the
//! caller so it can tell an outage apart from a user with no conversations.
//! Per conversation lookups degrade to "no preview, nothing unread".

use std::collections::{HashMap, HashSet};

use crate::{
    domain::{
        conversation::{sort_for_sidebar, Conversation, ConversationMember, ConversationRow, MemberRow},
        message::Message,
        profile::Profile,
    },
    usecases::contracts::{BackendError, ConversationStore, MessageStore, ProfileStore},
};

const MEMBERSHIPS_FETCH_FAILED: &str = "CONVERSATIONS_MEMBERSHIPS_FETCH_FAILED";
const CONVERSATIONS_FETCH_FAILED: &str = "CONVERSATIONS_FETCH_FAILED";
const MEMBERS_FETCH_FAILED: &str = "CONVERSATIONS_MEMBERS_FETCH_FAILED";
const PROFILES_FETCH_FAILED: &str = "CONVERSATIONS_PROFILES_FETCH_FAILED";
const LAST_MESSAGE_FETCH_FAILED: &str = "CONVERSATIONS_LAST_MESSAGE_FETCH_FAILED";
const UNREAD_COUNT_FETCH_FAILED: &str = "CONVERSATIONS_UNREAD_COUNT_FETCH_FAILED";

pub fn load_conversations<S>(store: &S, user_id: &str) -> Result<Vec<Conversation>, BackendError>
where
    S: ConversationStore + MessageStore + ProfileStore + ?Sized,
{
    try_load(store, user_id).map_err(|(code, error)| {
        tracing::warn!(code, user_id, error = %error, "conversation list fetch failed");
        error
    })
}

fn try_load<S>(store: &S, user_id: &str) -> Result<Vec<Conversation>, (&'static str, BackendError)>
where
    S: ConversationStore + MessageStore + ProfileStore + ?Sized,
{
    let memberships = store
        .memberships_for_user(user_id)
        .map_err(|error| (MEMBERSHIPS_FETCH_FAILED, error))?;
    if memberships.is_empty() {
        return Ok(Vec::new());
    }

    let conversation_ids = distinct(memberships.iter().map(|row| row.conversation_id.as_str()));
    let rows = store
        .conversations_by_ids(&conversation_ids)
        .map_err(|error| (CONVERSATIONS_FETCH_FAILED, error))?;
    let members = store
        .members_for_conversations(&conversation_ids)
        .map_err(|error| (MEMBERS_FETCH_FAILED, error))?;

    let profiles = resolve_profiles(store, &members);

    let mut conversations: Vec<Conversation> = rows
        .into_iter()
        .map(|row| {
            let own = memberships.iter().find(|m| m.conversation_id == row.id);
            let last_message = last_message(store, &row.id, &profiles);
            let unread_count = unread_count(store, &row.id, user_id);
            assemble(row, own, &members, &profiles, last_message, unread_count)
        })
        .collect();

    sort_for_sidebar(&mut conversations);

    tracing::debug!(user_id, count = conversations.len(), "conversation list loaded");

    Ok(conversations)
}

fn resolve_profiles<S>(store: &S, members: &[MemberRow]) -> HashMap<String, Profile>
where
    S: ProfileStore + ?Sized,
{
    let user_ids = distinct(members.iter().map(|row| row.user_id.as_str()));
    if user_ids.is_empty() {
        return HashMap::new();
    }

    match store.profiles_by_ids(&user_ids) {
        Ok(profiles) => profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect(),
        Err(error) => {
            tracing::warn!(
                code = PROFILES_FETCH_FAILED,
                error = %error,
                "member profiles unavailable; showing fallback labels"
            );
            HashMap::new()
        }
    }
}

fn last_message<S>(
    store: &S,
    conversation_id: &str,
    profiles: &HashMap<String, Profile>,
) -> Option<Message>
where
    S: MessageStore + ?Sized,
{
    match store.latest_message(conversation_id) {
        Ok(row) => row.map(|row| {
            let sender = profiles.get(&row.sender_id).cloned();
            Message::from_row(row, sender, Vec::new())
        }),
        Err(error) => {
            tracing::warn!(
                code = LAST_MESSAGE_FETCH_FAILED,
                conversation_id,
                error = %error,
                "last message unavailable"
            );
            None
        }
    }
}

fn unread_count<S>(store: &S, conversation_id: &str, user_id: &str) -> u32
where
    S: MessageStore + ?Sized,
{
    store
        .unread_count(conversation_id, user_id)
        .unwrap_or_else(|error| {
            tracing::warn!(
                code = UNREAD_COUNT_FETCH_FAILED,
                conversation_id,
                error = %error,
                "unread count unavailable"
            );
            0
        })
}

fn assemble(
    row: ConversationRow,
    own: Option<&MemberRow>,
    members: &[MemberRow],
    profiles: &HashMap<String, Profile>,
    last_message: Option<Message>,
    unread_count: u32,
) -> Conversation {
    let members = members
        .iter()
        .filter(|member| member.conversation_id == row.id)
        .map(|member| ConversationMember {
            user_id: member.user_id.clone(),
            role: member.role,
            is_muted: member.is_muted,
            is_pinned: member.is_pinned,
            profile: profiles.get(&member.user_id).cloned(),
        })
        .collect();

    Conversation {
        id: row.id,
        kind: row.kind,
        name: row.name,
        avatar_url: row.avatar_url,
        is_private: row.is_private.unwrap_or(false),
        created_at: row.created_at,
        members,
        last_message,
        unread_count,
        is_pinned: own.is_some_and(|m| m.is_pinned),
        is_muted: own.is_some_and(|m| m.is_muted),
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        domain::conversation::{ConversationKind, MemberRole},
        test_support::InMemoryBackend,
    };

    fn seeded() -> InMemoryBackend {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let backend = InMemoryBackend::new();
        backend.add_profile("me", "Me");
        backend.add_profile("alex", "Alex Chen");
        backend.add_conversation("c-old", ConversationKind::Direct, None, base);
        backend.add_conversation("c-new", ConversationKind::Group, Some("Design"), base);
        backend.add_conversation("c-pin", ConversationKind::Group, Some("Pinned"), base);
        for id in ["c-old", "c-new", "c-pin"] {
            backend.add_member(id, "me", MemberRole::Owner, id == "c-pin");
            backend.add_member(id, "alex", MemberRole::Member, false);
        }
        backend.add_message("m1", "c-old", "alex", "older", base + Duration::minutes(1));
        backend.add_message("m2", "c-new", "alex", "newer", base + Duration::minutes(5));
        backend.add_message("m3", "c-pin", "me", "pinned", base - Duration::days(3));
        backend
    }

    #[test]
    fn sorts_pinned_first_then_by_latest_activity() {
        let backend = seeded();

        let conversations = load_conversations(&backend, "me").expect("list should load");
        let ids: Vec<&str> = conversations.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, vec!["c-pin", "c-new", "c-old"]);
    }

    #[test]
    fn resolves_members_and_direct_title() {
        let backend = seeded();

        let conversations = load_conversations(&backend, "me").expect("list should load");
        let direct = conversations
            .iter()
            .find(|c| c.id == "c-old")
            .expect("direct conversation");

        assert_eq!(direct.members.len(), 2);
        assert_eq!(direct.title_for("me"), "Alex Chen");
        assert_eq!(
            direct.last_message.as_ref().map(|m| m.sender_label()),
            Some("Alex Chen")
        );
    }

    #[test]
    fn counts_unread_messages_from_other_members_only() {
        let backend = seeded();
        backend.add_message("m4", "c-new", "me", "mine", Utc::now());

        let conversations = load_conversations(&backend, "me").expect("list should load");
        let group = conversations.iter().find(|c| c.id == "c-new").expect("group");

        assert_eq!(group.unread_count, 1);
    }

    #[test]
    fn zero_memberships_skip_remaining_fetches() {
        let backend = InMemoryBackend::new();

        let conversations = load_conversations(&backend, "nobody").expect("empty list should load");

        assert!(conversations.is_empty());
        assert_eq!(backend.calls(), vec!["memberships_for_user".to_owned()]);
    }

    #[test]
    fn membership_failure_is_reported_instead_of_an_empty_list() {
        let backend = seeded();
        backend.fail_on("memberships_for_user", BackendError::Unavailable("down".into()));

        assert_eq!(
            load_conversations(&backend, "me"),
            Err(BackendError::Unavailable("down".into()))
        );
    }

    #[test]
    fn member_fetch_failure_is_reported() {
        let backend = seeded();
        backend.fail_on("members_for_conversations", BackendError::Unauthorized);

        assert_eq!(load_conversations(&backend, "me"), Err(BackendError::Unauthorized));
    }

    #[test]
    fn profile_failure_degrades_to_fallback_labels() {
        let backend = seeded();
        backend.fail_on("profiles_by_ids", BackendError::Unauthorized);

        let conversations = load_conversations(&backend, "me").expect("list should load");
        let direct = conversations.iter().find(|c| c.id == "c-old").expect("direct");

        assert_eq!(conversations.len(), 3);
        assert_eq!(direct.title_for("me"), "Unknown");
    }

    #[test]
    fn last_message_failure_degrades_to_no_preview() {
        let backend = seeded();
        backend.fail_on("latest_message", BackendError::Unavailable("timeout".into()));
        backend.fail_on("unread_count", BackendError::Unavailable("timeout".into()));

        let conversations = load_conversations(&backend, "me").expect("list should load");

        assert_eq!(conversations.len(), 3);
        assert!(conversations.iter().all(|c| c.last_message.is_none()));
        assert!(conversations.iter().all(|c| c.unread_count == 0));
    }
}
