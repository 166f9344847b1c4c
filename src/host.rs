/// Collaborators the dispatcher drives. The background bridge implements
/// these over `chrome.*` and the API client; tests implement them with fakes.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::actions::StatusMessage;
use crate::error::{ApiError, HostError};
use crate::menus::MenuEntry;
use crate::session::{AuthResponse, SettingKey, SettingsPatch};

/// Tab, menu and toolbar side of the browser. Calls are fire-and-forget:
/// implementations log their own failures.
#[async_trait(?Send)]
pub trait Browser {
    async fn open_tab(&self, url: &str);
    async fn send_to_tab(&self, tab_id: i32, message: &StatusMessage);
    async fn set_toolbar_icon(&self, tab_id: i32, saved: bool);
    async fn close_login_page(&self);
    async fn remove_all_menus(&self);
    async fn create_menu(&self, entry: &MenuEntry);
}

/// Persistent settings storage
#[async_trait(?Send)]
pub trait Settings {
    async fn get(&self, key: SettingKey) -> Option<String>;
    async fn set(&self, patch: SettingsPatch) -> Result<(), HostError>;
    async fn clear(&self) -> Result<(), HostError>;
}

/// Parameters of a single save call
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveParams {
    pub url: String,
    pub title: String,
    pub tab_id: i32,
}

/// Remote service client. `Ok(None)` means the server answered without a
/// `response` body, which callers treat as a failure.
#[async_trait(?Send)]
pub trait PocketApi {
    async fn get_guid(&self) -> Result<String, ApiError>;
    async fn authorize(&self, guid: &str, payload: &Value) -> Result<AuthResponse, ApiError>;
    async fn save_to_pocket(&self, params: &SaveParams) -> Result<Option<Value>, ApiError>;
    async fn sync_item_tags(
        &self,
        item_id: &str,
        tags: &[String],
        info: &Map<String, Value>,
    ) -> Result<Option<Value>, ApiError>;
    async fn remove_item(&self, item_id: &str) -> Result<Option<Value>, ApiError>;
}

/// Records successful saves (toolbar icon state, recent-save history)
#[async_trait(?Send)]
pub trait SaveHistory {
    async fn save_success(&self, tab_id: i32, payload: Value);
}

pub trait Localizer {
    fn localize(&self, key: &str) -> String;
}

/// Error-reporting sink
pub trait Diagnostics {
    fn capture(&self, fingerprint: &str, message: &str);
}

/// Every API client call resolves to `{ response }`. A missing or falsy
/// `response` (`null`, `false`, `0`, `""`) is an unsuccessful call.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub response: Option<Value>,
}

impl ApiEnvelope {
    /// The response body, or `None` when the call did not succeed
    pub fn into_payload(self) -> Option<Value> {
        self.response.filter(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
