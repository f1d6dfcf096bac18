use chrono::{DateTime, Utc};

use crate::{domain::profile::Profile, ui::time_format};

pub fn render_profile(profile: &Profile, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        profile.label().unwrap_or("Unnamed"),
        profile.id
    )];

    if let Some(username) = profile.username.as_deref() {
        lines.push(format!("  username: @{username}"));
    }

    let presence = profile.presence().as_str();
    match profile.last_seen {
        Some(last_seen) => lines.push(format!(
            "  status:   {presence}, last seen {}",
            time_format::relative(last_seen, now)
        )),
        None => lines.push(format!("  status:   {presence}")),
    }

    if let Some(bio) = profile.bio.as_deref().filter(|bio| !bio.trim().is_empty()) {
        lines.push(format!("  bio:      {bio}"));
    }

    lines
}

/// One line per profile for the people list.
pub fn render_directory(profiles: &[Profile]) -> Vec<String> {
    if profiles.is_empty() {
        return vec!["No profiles found".to_owned()];
    }

    profiles
        .iter()
        .map(|profile| {
            format!(
                "{:<8} {} ({})",
                profile.presence().as_str(),
                profile.label().unwrap_or("Unnamed"),
                profile.id
            )
        })
        .collect()
}
