/// Messages exchanged between the background and content scripts.
///
/// Status messages go background → tab and are tagged by `action`.
/// Content messages go tab → background and are tagged by `type`.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload of the remove-item request, echoed back in its status messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePayload {
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Payload of a tag edit. Everything besides `item_id` and `tags` is
/// forwarded to the API as action info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSyncPayload {
    pub item_id: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorModePayload {
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl From<ColorModePayload> for Theme {
    fn from(payload: ColorModePayload) -> Self {
        if payload.dark_mode { Theme::Dark } else { Theme::Light }
    }
}

/// Status relayed to the page's injected UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusMessage {
    SaveToPocketRequest,
    SaveToPocketSuccess(Value),
    SaveToPocketFailure,
    TagSyncRequest,
    TagSyncSuccess(TagSyncPayload),
    TagSyncFailure(TagSyncPayload),
    RemoveItemRequest,
    RemoveItemSuccess(RemovePayload),
    RemoveItemFailure(RemovePayload),
    UpdateTagError(Value),
    ColorModeChange(ColorModePayload),
}

/// Message sent up by a content script or the login page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentMessage {
    AuthCodeReceived(Value),
    TagsSync(TagSyncPayload),
    RemoveItem(RemovePayload),
    UpdateTagError(Value),
    ColorModeChange(ColorModePayload),
    LoggedOutOfPocket,
}

/// Merge the `isLink` flag into a save response for the history collaborator
pub fn with_is_link(payload: &Value, is_link: bool) -> Value {
    let mut merged = match payload {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merged.insert("isLink".to_string(), Value::Bool(is_link));
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_has_no_payload() {
        let json = serde_json::to_value(StatusMessage::SaveToPocketRequest).unwrap();
        assert_eq!(json, json!({ "action": "SAVE_TO_POCKET_REQUEST" }));
    }

    #[test]
    fn test_success_carries_payload() {
        let message = StatusMessage::SaveToPocketSuccess(json!({ "item": { "id": "42" } }));
        let json = serde_json::to_value(message).unwrap();

        assert_eq!(
            json,
            json!({
                "action": "SAVE_TO_POCKET_SUCCESS",
                "payload": { "item": { "id": "42" } },
            })
        );
    }

    #[test]
    fn test_action_identifiers() {
        let cases = [
            (StatusMessage::SaveToPocketFailure, "SAVE_TO_POCKET_FAILURE"),
            (StatusMessage::TagSyncRequest, "TAG_SYNC_REQUEST"),
            (StatusMessage::RemoveItemRequest, "REMOVE_ITEM_REQUEST"),
            (StatusMessage::UpdateTagError(json!("too long")), "UPDATE_TAG_ERROR"),
            (
                StatusMessage::ColorModeChange(ColorModePayload { dark_mode: true }),
                "COLOR_MODE_CHANGE",
            ),
        ];

        for (message, action) in cases {
            let json = serde_json::to_value(message).unwrap();
            assert_eq!(json["action"], action);
        }
    }

    #[test]
    fn test_remove_payload_keeps_extra_fields() {
        let message: ContentMessage = serde_json::from_value(json!({
            "type": "REMOVE_ITEM",
            "payload": { "itemId": "99", "source": "panel" },
        }))
        .unwrap();

        let ContentMessage::RemoveItem(payload) = message else {
            panic!("expected RemoveItem");
        };
        assert_eq!(payload.item_id, "99");

        let echoed = serde_json::to_value(StatusMessage::RemoveItemFailure(payload)).unwrap();
        assert_eq!(
            echoed,
            json!({
                "action": "REMOVE_ITEM_FAILURE",
                "payload": { "itemId": "99", "source": "panel" },
            })
        );
    }

    #[test]
    fn test_tag_sync_payload_splits_action_info() {
        let payload: TagSyncPayload = serde_json::from_value(json!({
            "item_id": "12",
            "tags": ["rust", "wasm"],
            "cxt_ui": "toolbar",
        }))
        .unwrap();

        assert_eq!(payload.item_id, "12");
        assert_eq!(payload.tags, vec!["rust", "wasm"]);
        assert_eq!(payload.rest.get("cxt_ui"), Some(&json!("toolbar")));
    }

    #[test]
    fn test_content_messages() {
        let message: ContentMessage =
            serde_json::from_value(json!({ "type": "LOGGED_OUT_OF_POCKET" })).unwrap();
        assert_eq!(message, ContentMessage::LoggedOutOfPocket);

        let message: ContentMessage = serde_json::from_value(json!({
            "type": "COLOR_MODE_CHANGE",
            "payload": { "darkMode": false },
        }))
        .unwrap();
        assert_eq!(
            message,
            ContentMessage::ColorModeChange(ColorModePayload { dark_mode: false })
        );

        let unknown = serde_json::from_value::<ContentMessage>(json!({ "type": "SOMETHING_NEW" }));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_with_is_link() {
        let merged = with_is_link(&json!({ "item": { "id": "42" } }), false);
        assert_eq!(merged, json!({ "item": { "id": "42" }, "isLink": false }));

        let merged = with_is_link(&json!(true), true);
        assert_eq!(merged, json!({ "isLink": true }));
    }

    #[test]
    fn test_theme_from_color_mode() {
        assert_eq!(Theme::from(ColorModePayload { dark_mode: true }), Theme::Dark);
        assert_eq!(Theme::from(ColorModePayload { dark_mode: false }).as_str(), "light");
    }
}
