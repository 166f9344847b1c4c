/// Background action dispatcher: routes browser events and content-script
/// messages to handlers and relays status back to the originating tab.
use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::actions::{ContentMessage, RemovePayload, StatusMessage, TagSyncPayload, Theme, with_is_link};
use crate::classify::{is_system_link, is_system_page};
use crate::config::Endpoints;
use crate::error::AuthFlowError;
use crate::host::{Browser, Diagnostics, Localizer, PocketApi, SaveHistory, SaveParams, Settings};
use crate::menus::{MenuItemId, build_menu_entries};
use crate::session::{AuthSession, PendingSave, SaveRequest, SettingKey, SettingsPatch};
use crate::tab_data::{ChangeInfo, ContextClickInfo, TabInfo};

/// Fingerprint attached to login failures in the error reporter
pub const AUTH_ERROR_FINGERPRINT: &str = "Auth Error";

/// Every event the background reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    ToolbarClick(TabInfo),
    ContextClick { info: ContextClickInfo, tab: TabInfo },
    TabUpdated { tab_id: i32, change_info: ChangeInfo },
    Message { message: ContentMessage, tab: Option<TabInfo> },
    Installed,
}

/// Everything the dispatcher talks to
#[derive(Clone)]
pub struct Collaborators {
    pub browser: Rc<dyn Browser>,
    pub settings: Rc<dyn Settings>,
    pub api: Rc<dyn PocketApi>,
    pub history: Rc<dyn SaveHistory>,
    pub localizer: Rc<dyn Localizer>,
    pub diagnostics: Rc<dyn Diagnostics>,
}

pub struct Dispatcher {
    host: Collaborators,
    endpoints: Endpoints,
    pending: PendingSave,
}

impl Dispatcher {
    pub fn new(host: Collaborators, endpoints: Endpoints) -> Dispatcher {
        Dispatcher {
            host,
            endpoints,
            pending: PendingSave::new(),
        }
    }

    pub fn pending_save(&self) -> Option<SaveRequest> {
        self.pending.peek()
    }

    pub async fn handle(&self, trigger: Trigger) {
        debug!("dispatching {:?}", trigger);

        match trigger {
            Trigger::ToolbarClick(tab) => self.browser_action(tab).await,
            Trigger::ContextClick { info, tab } => self.context_click(info, tab).await,
            Trigger::TabUpdated {
                tab_id,
                change_info,
            } => self.tab_updated(tab_id, &change_info).await,
            Trigger::Message { message, tab } => self.content_message(message, tab).await,
            Trigger::Installed => self.set_context_menus().await,
        }
    }

    async fn content_message(&self, message: ContentMessage, tab: Option<TabInfo>) {
        let tab_id = tab.map(|t| t.id);

        match (message, tab_id) {
            (ContentMessage::AuthCodeReceived(payload), _) => {
                self.auth_code_received(payload).await
            }
            (ContentMessage::ColorModeChange(payload), _) => {
                self.set_color_mode(payload.into()).await
            }
            (ContentMessage::LoggedOutOfPocket, _) => self.logged_out_of_pocket().await,
            (ContentMessage::TagsSync(payload), Some(tab_id)) => {
                self.tags_sync(tab_id, payload).await
            }
            (ContentMessage::RemoveItem(payload), Some(tab_id)) => {
                self.remove_item(tab_id, payload).await
            }
            (ContentMessage::UpdateTagError(payload), Some(tab_id)) => {
                self.tags_error(tab_id, payload).await
            }
            (message, None) => warn!("ignoring {:?}: sender has no tab", message),
        }
    }

    /// Toolbar icon clicked
    pub async fn browser_action(&self, tab: TabInfo) {
        if is_system_page(&tab) {
            return self.open_pocket_home().await;
        }

        self.save(SaveRequest::page(tab.id, tab.url, tab.title)).await
    }

    /// Right-click menu entry chosen, on the page or on the toolbar icon
    pub async fn context_click(&self, info: ContextClickInfo, tab: TabInfo) {
        match info.menu_item_id {
            MenuItemId::ToolbarContextClickHome => self.open_pocket_home().await,
            MenuItemId::ToolbarContextClickList => self.open_pocket_list().await,
            MenuItemId::ToolbarContextClickLogOut => self.log_out().await,
            MenuItemId::ToolbarContextClickLogIn => self.log_in(None).await,
            MenuItemId::PageContextClick => {
                let target = info.link_url.as_deref().unwrap_or(&info.page_url);
                if is_system_link(target) {
                    return self.open_pocket_home().await;
                }

                self.save(SaveRequest {
                    page_url: info.page_url,
                    link_url: info.link_url,
                    title: tab.title,
                    tab_id: tab.id,
                })
                .await
            }
        }
    }

    /// Save a page or link, deferring to the login flow when there is no
    /// usable access token.
    pub async fn save(&self, request: SaveRequest) {
        if !self.has_access_token().await {
            return self.log_in(Some(request)).await;
        }

        let tab_id = request.tab_id;
        self.send(tab_id, StatusMessage::SaveToPocketRequest).await;

        let params = SaveParams {
            url: request.url().to_string(),
            title: request.title.clone(),
            tab_id,
        };

        match self.host.api.save_to_pocket(&params).await {
            Ok(Some(payload)) => {
                let history_payload = with_is_link(&payload, request.is_link());
                self.send(tab_id, StatusMessage::SaveToPocketSuccess(payload))
                    .await;
                self.host.history.save_success(tab_id, history_payload).await;
            }
            Ok(None) => {
                self.send(tab_id, StatusMessage::SaveToPocketFailure).await;
            }
            Err(err) if err.is_auth_expired() => {
                info!("access token rejected while saving, redirecting to login");
                self.log_in(Some(request)).await;
            }
            Err(err) => {
                warn!("save of {} failed: {}", params.url, err);
                self.send(tab_id, StatusMessage::SaveToPocketFailure).await;
            }
        }
    }

    pub async fn remove_item(&self, tab_id: i32, payload: RemovePayload) {
        self.send(tab_id, StatusMessage::RemoveItemRequest).await;

        let removed = match self.host.api.remove_item(&payload.item_id).await {
            Ok(response) => response.is_some(),
            Err(err) => {
                warn!("remove of item {} failed: {}", payload.item_id, err);
                false
            }
        };

        let message = if removed {
            StatusMessage::RemoveItemSuccess(payload)
        } else {
            StatusMessage::RemoveItemFailure(payload)
        };
        self.send(tab_id, message).await;

        if removed {
            self.host.browser.set_toolbar_icon(tab_id, false).await;
        }
    }

    pub async fn tags_sync(&self, tab_id: i32, payload: TagSyncPayload) {
        self.send(tab_id, StatusMessage::TagSyncRequest).await;

        let synced = match self
            .host
            .api
            .sync_item_tags(&payload.item_id, &payload.tags, &payload.rest)
            .await
        {
            Ok(response) => response.is_some(),
            Err(err) => {
                warn!("tag sync for item {} failed: {}", payload.item_id, err);
                false
            }
        };

        let message = if synced {
            StatusMessage::TagSyncSuccess(payload)
        } else {
            StatusMessage::TagSyncFailure(payload)
        };
        self.send(tab_id, message).await;
    }

    /// Reflect a tag validation error found by the page UI
    pub async fn tags_error(&self, tab_id: i32, payload: Value) {
        self.send(tab_id, StatusMessage::UpdateTagError(payload)).await;
    }

    /// The login page handed back an auth code. Errors are reported, never
    /// shown; the login tab is closed and menus rebuilt either way.
    pub async fn auth_code_received(&self, payload: Value) {
        match self.authenticate(&payload).await {
            Ok(session) => info!("logged in as {}", session.username),
            Err(err) => {
                warn!("login failed: {}", err);
                self.host
                    .diagnostics
                    .capture(AUTH_ERROR_FINGERPRINT, &err.to_string());
            }
        }

        self.host.browser.close_login_page().await;
        self.set_context_menus().await;

        if let Some(request) = self.pending.take() {
            self.save(request).await;
        }
    }

    async fn authenticate(&self, payload: &Value) -> Result<AuthSession, AuthFlowError> {
        let guid = self.host.api.get_guid().await?;
        let response = self.host.api.authorize(&guid, payload).await?;
        let session = AuthSession::from(response);
        self.host
            .settings
            .set(SettingsPatch::from(session.clone()))
            .await?;
        Ok(session)
    }

    /// Store `request` as the pending save (overwriting any earlier one) and
    /// open the login page.
    pub async fn log_in(&self, request: Option<SaveRequest>) {
        if let Some(dropped) = self.pending.store(request) {
            debug!("pending save for {} overwritten", dropped.url());
        }
        self.host.browser.open_tab(&self.endpoints.auth_url).await;
    }

    pub async fn log_out(&self) {
        self.host.browser.open_tab(&self.endpoints.logout_url).await;
    }

    /// The service reported the user logged out elsewhere
    pub async fn logged_out_of_pocket(&self) {
        if let Err(err) = self.host.settings.clear().await {
            warn!("failed to clear settings on logout: {}", err);
        }
        self.set_context_menus().await;
    }

    pub async fn open_pocket_list(&self) {
        self.host.browser.open_tab(&self.endpoints.list_url).await;
    }

    pub async fn open_pocket_home(&self) {
        self.host.browser.open_tab(&self.endpoints.home_url).await;
    }

    /// Navigation away from a page resets its "saved" icon
    pub async fn tab_updated(&self, tab_id: i32, change_info: &ChangeInfo) {
        if change_info.is_navigation() {
            self.host.browser.set_toolbar_icon(tab_id, false).await;
        }
    }

    pub async fn set_color_mode(&self, theme: Theme) {
        if let Err(err) = self.host.settings.set(SettingsPatch::theme(theme)).await {
            warn!("failed to persist theme {}: {}", theme.as_str(), err);
        }
    }

    pub async fn set_context_menus(&self) {
        self.host.browser.remove_all_menus().await;

        let logged_in = self.has_access_token().await;
        let localizer = &self.host.localizer;
        for entry in build_menu_entries(logged_in, |key| localizer.localize(key)) {
            self.host.browser.create_menu(&entry).await;
        }
    }

    async fn has_access_token(&self) -> bool {
        self.host
            .settings
            .get(SettingKey::AccessToken)
            .await
            .is_some_and(|token| !token.is_empty())
    }

    async fn send(&self, tab_id: i32, message: StatusMessage) {
        self.host.browser.send_to_tab(tab_id, &message).await;
    }
}
