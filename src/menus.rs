/// Context menu identifiers and the menu set built from auth state
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuItemId {
    #[serde(rename = "pageContextClick")]
    PageContextClick,
    #[serde(rename = "toolbarContextClickList")]
    ToolbarContextClickList,
    #[serde(rename = "toolbarContextClickHome")]
    ToolbarContextClickHome,
    #[serde(rename = "toolbarContextClickLogOut")]
    ToolbarContextClickLogOut,
    #[serde(rename = "toolbarContextClickLogIn")]
    ToolbarContextClickLogIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Page,
    Frame,
    Editable,
    Image,
    Video,
    Audio,
    Link,
    Selection,
    Action,
}

/// Every content context the page "save" entry appears in
pub const CONTENT_CONTEXTS: [MenuContext; 8] = [
    MenuContext::Page,
    MenuContext::Frame,
    MenuContext::Editable,
    MenuContext::Image,
    MenuContext::Video,
    MenuContext::Audio,
    MenuContext::Link,
    MenuContext::Selection,
];

/// Argument to `chrome.contextMenus.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: MenuItemId,
    pub title: String,
    pub contexts: Vec<MenuContext>,
}

impl MenuEntry {
    fn toolbar(id: MenuItemId, title: String) -> MenuEntry {
        MenuEntry {
            id,
            title,
            contexts: vec![MenuContext::Action],
        }
    }
}

/// Build the full menu set, in creation order. Exactly one of log-in or
/// log-out is included.
pub fn build_menu_entries(logged_in: bool, localize: impl Fn(&str) -> String) -> Vec<MenuEntry> {
    let account_entry = if logged_in {
        MenuEntry::toolbar(
            MenuItemId::ToolbarContextClickLogOut,
            localize("context_menu_log_out"),
        )
    } else {
        MenuEntry::toolbar(
            MenuItemId::ToolbarContextClickLogIn,
            localize("context_menu_log_in"),
        )
    };

    vec![
        MenuEntry {
            id: MenuItemId::PageContextClick,
            title: localize("context_menu_save"),
            contexts: CONTENT_CONTEXTS.to_vec(),
        },
        MenuEntry::toolbar(
            MenuItemId::ToolbarContextClickList,
            localize("context_menu_open_list"),
        ),
        MenuEntry::toolbar(
            MenuItemId::ToolbarContextClickHome,
            localize("context_menu_discover_more"),
        ),
        account_entry,
    ]
}
