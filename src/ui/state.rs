/// Save panel state, driven by the status messages relayed from the background
use serde_json::Value;
use thiserror::Error;

use crate::actions::{ColorModePayload, StatusMessage, Theme};

pub const MAX_TAG_LENGTH: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    SaveFailed,
    Removing,
    Removed,
    RemoveFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagStatus {
    #[default]
    Idle,
    Syncing,
    Synced,
    Failed,
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub visible: bool,
    pub status: SaveStatus,
    pub item_id: Option<String>,
    pub tags: Vec<String>,
    pub tag_status: TagStatus,
}

impl PanelState {
    /// The panel is mounted in response to a save request, so it starts
    /// out already saving.
    pub fn saving() -> Self {
        PanelState {
            visible: true,
            status: SaveStatus::Saving,
            ..Default::default()
        }
    }

    pub fn dismissed(&self) -> Self {
        PanelState {
            visible: false,
            ..self.clone()
        }
    }

    pub fn apply(&self, message: &StatusMessage) -> Self {
        let mut next = self.clone();

        match message {
            StatusMessage::SaveToPocketRequest => next = PanelState::saving(),
            StatusMessage::SaveToPocketSuccess(payload) => {
                next.status = SaveStatus::Saved;
                next.item_id = item_id_of(payload);
                next.tags = tags_of(payload);
            }
            StatusMessage::SaveToPocketFailure => next.status = SaveStatus::SaveFailed,
            StatusMessage::RemoveItemRequest => next.status = SaveStatus::Removing,
            StatusMessage::RemoveItemSuccess(_) => {
                next.status = SaveStatus::Removed;
                next.item_id = None;
                next.tags.clear();
                next.tag_status = TagStatus::Idle;
            }
            StatusMessage::RemoveItemFailure(_) => next.status = SaveStatus::RemoveFailed,
            StatusMessage::TagSyncRequest => next.tag_status = TagStatus::Syncing,
            StatusMessage::TagSyncSuccess(payload) => {
                next.tags = payload.tags.clone();
                next.tag_status = TagStatus::Synced;
            }
            StatusMessage::TagSyncFailure(_) => next.tag_status = TagStatus::Failed,
            StatusMessage::UpdateTagError(payload) => {
                next.tag_status = TagStatus::Invalid(tag_error_text(payload));
            }
            StatusMessage::ColorModeChange(_) => {}
        }

        next
    }

    /// Tags and removal only make sense for an item the server knows about
    pub fn can_edit(&self) -> bool {
        self.item_id.is_some()
            && matches!(self.status, SaveStatus::Saved | SaveStatus::RemoveFailed)
    }
}

/// Panel class for the page's color scheme
pub fn theme_class(dark_mode: bool) -> &'static str {
    match Theme::from(ColorModePayload { dark_mode }) {
        Theme::Dark => "pocket-theme-dark",
        Theme::Light => "pocket-theme-light",
    }
}

/// Item id from a save response: `item.item_id` or `item.id`, string or number
pub fn item_id_of(payload: &Value) -> Option<String> {
    let item = payload.get("item")?;
    let id = item.get("item_id").or_else(|| item.get("id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Existing tags on a saved item: either a list of names or the API's
/// `{ name: {...} }` map.
pub fn tags_of(payload: &Value) -> Vec<String> {
    match payload.get("item").and_then(|item| item.get("tags")) {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        Some(Value::Object(tags)) => tags.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn tag_error_text(payload: &Value) -> String {
    payload
        .as_str()
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("Invalid tags")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Tags are limited to 25 characters: \"{0}\"")]
    TooLong(String),

    #[error("Enter at least one tag")]
    Empty,
}

/// Parse comma-separated tag input: trim, drop blanks and duplicates
/// (keeping first occurrence order).
pub fn validate_tags(input: &str) -> Result<Vec<String>, TagError> {
    let mut tags: Vec<String> = Vec::new();

    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong(tag.to_string()));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    if tags.is_empty() {
        return Err(TagError::Empty);
    }
    Ok(tags)
}

/// Existing tags followed by any new ones not already present
pub fn merge_tags(existing: &[String], added: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for tag in added {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}
