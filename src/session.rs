/// Save requests, the post-auth pending slot, and the persisted auth session
use std::cell::RefCell;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::actions::Theme;

/// One user-triggered save. `link_url` is set when a link on the page was
/// right-clicked rather than the page itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub page_url: String,
    pub link_url: Option<String>,
    pub title: String,
    pub tab_id: i32,
}

impl SaveRequest {
    pub fn page(tab_id: i32, page_url: String, title: String) -> SaveRequest {
        SaveRequest {
            page_url,
            link_url: None,
            title,
            tab_id,
        }
    }

    /// The URL actually sent to the service
    pub fn url(&self) -> &str {
        self.link_url.as_deref().unwrap_or(&self.page_url)
    }

    pub fn is_link(&self) -> bool {
        self.link_url.is_some()
    }
}

/// Holds at most one save that is waiting for the user to log in.
///
/// Last write wins: storing a second request drops the first. There is no
/// queue.
#[derive(Debug, Default)]
pub struct PendingSave {
    slot: RefCell<Option<SaveRequest>>,
}

impl PendingSave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents, returning whatever was overwritten
    pub fn store(&self, request: Option<SaveRequest>) -> Option<SaveRequest> {
        self.slot.replace(request)
    }

    pub fn take(&self) -> Option<SaveRequest> {
        self.slot.borrow_mut().take()
    }

    pub fn peek(&self) -> Option<SaveRequest> {
        self.slot.borrow().clone()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

/// Keys in persistent settings storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AccessToken,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::AccessToken => "access_token",
        }
    }
}

/// Partial settings write. Unset fields are left untouched in storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    pub fn theme(theme: Theme) -> Self {
        SettingsPatch {
            theme: Some(theme),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    #[serde(deserialize_with = "string_or_number")]
    pub premium_status: String,
}

/// Response of the token exchange
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub account: Account,
    pub username: String,
}

/// What gets persisted after a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub premium_status: String,
    pub username: String,
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        AuthSession {
            access_token: response.access_token,
            premium_status: response.account.premium_status,
            username: response.username,
        }
    }
}

impl From<AuthSession> for SettingsPatch {
    fn from(session: AuthSession) -> Self {
        SettingsPatch {
            access_token: Some(session.access_token),
            premium_status: Some(session.premium_status),
            username: Some(session.username),
            theme: None,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(String::from(if b { "1" } else { "0" })),
        other => Err(serde::de::Error::custom(format!(
            "expected premium_status as string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(tab_id: i32, url: &str) -> SaveRequest {
        SaveRequest::page(tab_id, url.to_string(), "Title".to_string())
    }

    #[test]
    fn test_resolved_url_prefers_link() {
        let mut req = request(1, "https://example.com");
        assert_eq!(req.url(), "https://example.com");
        assert!(!req.is_link());

        req.link_url = Some("https://example.com/linked".to_string());
        assert_eq!(req.url(), "https://example.com/linked");
        assert!(req.is_link());
    }

    #[test]
    fn test_pending_save_last_write_wins() {
        let pending = PendingSave::new();
        assert!(pending.is_empty());

        assert_eq!(pending.store(Some(request(1, "https://a.com"))), None);
        let overwritten = pending.store(Some(request(2, "https://b.com")));

        assert_eq!(overwritten, Some(request(1, "https://a.com")));
        assert_eq!(pending.peek(), Some(request(2, "https://b.com")));
    }

    #[test]
    fn test_pending_save_take_clears() {
        let pending = PendingSave::new();
        pending.store(Some(request(1, "https://a.com")));

        assert_eq!(pending.take(), Some(request(1, "https://a.com")));
        assert!(pending.is_empty());
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn test_auth_response_premium_status_forms() {
        let numeric: AuthResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "account": { "premium_status": 1, "email": "a@b.c" },
            "username": "reader",
        }))
        .unwrap();
        assert_eq!(numeric.account.premium_status, "1");

        let text: AuthResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "account": { "premium_status": "0" },
            "username": "reader",
        }))
        .unwrap();
        assert_eq!(text.account.premium_status, "0");
    }

    #[test]
    fn test_session_patch_serialization() {
        let session = AuthSession {
            access_token: "tok".to_string(),
            premium_status: "1".to_string(),
            username: "reader".to_string(),
        };
        let json = serde_json::to_value(SettingsPatch::from(session)).unwrap();

        assert_eq!(
            json,
            json!({ "access_token": "tok", "premium_status": "1", "username": "reader" })
        );

        let json = serde_json::to_value(SettingsPatch::theme(Theme::Dark)).unwrap();
        assert_eq!(json, json!({ "theme": "dark" }));
    }
}
