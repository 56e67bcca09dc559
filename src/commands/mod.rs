//! Command handlers: the boundary between a front end and the stores.
//!
//! Handlers validate raw input (ids and dates arrive as strings), call the
//! store, and post a toast describing the outcome. Failures come back as
//! `Err(String)` ready for display.

pub mod journal;
pub mod medications;
pub mod report;
pub mod settings;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core_state::AppState;

/// Posts an error toast and returns the message as an `Err`.
fn fail<T>(state: &AppState, message: impl Into<String>) -> Result<T, String> {
    let message = message.into();
    state.toasts.error(message.clone());
    Err(message)
}

fn parse_id(state: &AppState, raw: &str, what: &str) -> Result<Uuid, String> {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Ok(id),
        Err(e) => fail(state, format!("Invalid {what} ID: {e}")),
    }
}

fn parse_date(state: &AppState, raw: &str) -> Result<NaiveDate, String> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => fail(state, format!("Invalid date: {raw} (expected YYYY-MM-DD)")),
    }
}

fn parse_optional_date(state: &AppState, raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    raw.map(|r| parse_date(state, r)).transpose()
}
