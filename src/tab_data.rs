/// Browser event payloads the background receives
use serde::{Deserialize, Serialize};

use crate::menus::MenuItemId;

/// The subset of `chrome.tabs.Tab` the dispatcher reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String) -> TabInfo {
        TabInfo { id, url, title }
    }
}

/// `chrome.contextMenus.OnClickData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextClickInfo {
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub page_url: String,
}

/// `chrome.tabs.onUpdated` change info
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ChangeInfo {
    /// True when the tab has started loading a different URL
    pub fn is_navigation(&self) -> bool {
        self.status.as_deref() == Some("loading") && self.url.is_some()
    }
}
