//! Episode journal commands.
//!
//! - `record_episode`: validate and record a new episode
//! - `update_episode`: patch an existing episode
//! - `recent_episodes`: newest episodes first

use crate::config::DEFAULT_RECENT_LIMIT;
use crate::core_state::AppState;
use crate::models::{Episode, EpisodePatch, NewEpisode};

use super::{fail, parse_id};

const MAX_TYPE_LEN: usize = 50;
const MAX_NOTES_LEN: usize = 2000;

fn validate_text(
    state: &AppState,
    value: Option<&str>,
    field: &str,
    max: usize,
) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => {
            fail(state, format!("{field} must be {max} characters or fewer"))
        }
        _ => Ok(()),
    }
}

/// Records an episode and returns its ID.
pub fn record_episode(state: &mut AppState, entry: NewEpisode) -> Result<String, String> {
    if let Some(ref code) = entry.episode_type {
        if code.trim().is_empty() {
            return fail(state, "Episode type cannot be blank");
        }
    }
    validate_text(state, entry.episode_type.as_deref(), "Episode type", MAX_TYPE_LEN)?;
    validate_text(state, entry.notes.as_deref(), "Notes", MAX_NOTES_LEN)?;

    let id = state.episodes.add(entry);
    state.toasts.success("Episode saved");
    Ok(id.to_string())
}

/// Applies `patch` to an episode. Returns false when no episode has that ID.
pub fn update_episode(
    state: &mut AppState,
    episode_id: &str,
    patch: EpisodePatch,
) -> Result<bool, String> {
    let id = parse_id(state, episode_id, "episode")?;
    validate_text(state, patch.episode_type.as_deref(), "Episode type", MAX_TYPE_LEN)?;
    validate_text(state, patch.notes.as_deref(), "Notes", MAX_NOTES_LEN)?;

    let updated = state.episodes.update(id, patch);
    if updated {
        state.toasts.success("Episode updated");
    } else {
        state.toasts.info("No episode with that ID; nothing changed");
    }
    Ok(updated)
}

/// The most recent episodes, five unless `limit` says otherwise.
pub fn recent_episodes(state: &AppState, limit: Option<usize>) -> Vec<Episode> {
    state
        .episodes
        .recent(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .to_vec()
}
