use crate::{
    domain::profile::{Profile, ProfileUpdate},
    usecases::contracts::{BackendError, ProfileStore},
};

const PROFILE_FETCH_FAILED: &str = "PROFILE_FETCH_FAILED";
const PROFILES_LIST_FAILED: &str = "PROFILES_LIST_FAILED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateProfileError {
    NothingToUpdate,
    Unauthorized,
    ProfileNotFound,
    UsernameTaken,
    TemporarilyUnavailable,
    Rejected(String),
}

impl std::fmt::Display for UpdateProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToUpdate => f.write_str("no profile fields were given"),
            Self::Unauthorized => f.write_str("not authorized to update this profile"),
            Self::ProfileNotFound => f.write_str("profile not found"),
            Self::UsernameTaken => f.write_str("username is already taken"),
            Self::TemporarilyUnavailable => f.write_str("backend temporarily unavailable"),
            Self::Rejected(details) => write!(f, "profile update rejected: {details}"),
        }
    }
}

impl std::error::Error for UpdateProfileError {}

pub fn load_profile(store: &(impl ProfileStore + ?Sized), user_id: &str) -> Option<Profile> {
    store.profile(user_id).unwrap_or_else(|error| {
        tracing::warn!(code = PROFILE_FETCH_FAILED, user_id, error = %error, "profile fetch failed");
        None
    })
}

pub fn list_profiles(store: &(impl ProfileStore + ?Sized)) -> Vec<Profile> {
    store.all_profiles().unwrap_or_else(|error| {
        tracing::warn!(code = PROFILES_LIST_FAILED, error = %error, "profile list fetch failed");
        Vec::new()
    })
}

pub fn update_profile(
    store: &(impl ProfileStore + ?Sized),
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Profile, UpdateProfileError> {
    if update.is_empty() {
        return Err(UpdateProfileError::NothingToUpdate);
    }

    let profile = store
        .update_profile(user_id, update)
        .map_err(map_source_error)?;

    tracing::info!(user_id, "profile updated");

    Ok(profile)
}

fn map_source_error(error: BackendError) -> UpdateProfileError {
    match error {
        BackendError::Unauthorized => UpdateProfileError::Unauthorized,
        BackendError::NotFound => UpdateProfileError::ProfileNotFound,
        BackendError::Duplicate => UpdateProfileError::UsernameTaken,
        BackendError::Unavailable(_) => UpdateProfileError::TemporarilyUnavailable,
        other => UpdateProfileError::Rejected(other.to_string()),
    }
}
