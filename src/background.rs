/// Background service worker entry: wires `chrome.*` events into the
/// dispatcher and implements its collaborators over the JS bridge.
use std::rc::Rc;

use async_trait::async_trait;
use log::{info, warn};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::actions::{ContentMessage, StatusMessage};
use crate::config::Endpoints;
use crate::dispatcher::{Collaborators, Dispatcher, Trigger};
use crate::error::{ApiError, HostError};
use crate::host::{
    ApiEnvelope, Browser, Diagnostics, Localizer, PocketApi, SaveHistory, SaveParams, Settings,
};
use crate::js::{describe, from_js, is_nullish, to_js};
use crate::menus::MenuEntry;
use crate::session::{AuthResponse, SettingKey, SettingsPatch};
use crate::tab_data::{ChangeInfo, ContextClickInfo, TabInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn setToolbarIcon(tab_id: i32, saved: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn closeLoginPage() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeAllMenus() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createMenu(entry: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getSetting(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(patch: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn clearSettings() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getGuid() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn authorize(guid: &str, payload: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn saveToPocket(params: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncItemTags(item_id: &str, tags: JsValue, info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeItem(item_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn saveSuccess(tab_id: i32, payload: JsValue) -> Result<(), JsValue>;

    fn localize(key: &str) -> String;

    fn captureError(fingerprint: &str, message: &str);

    fn onToolbarClick(callback: &js_sys::Function);
    fn onContextClick(callback: &js_sys::Function);
    fn onTabUpdated(callback: &js_sys::Function);
    fn onRuntimeMessage(callback: &js_sys::Function);
    fn onInstalled(callback: &js_sys::Function);
}

/// Collaborators backed by the extension APIs
pub struct ChromeHost;

fn log_failure(call: &'static str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        let err = HostError::Browser {
            call,
            message: describe(&e),
        };
        warn!("{}", err);
    }
}

/// Turn a rejected API promise into an `ApiError`, keeping the sentinel code
fn api_error(err: JsValue) -> ApiError {
    let code = js_sys::Reflect::get(&err, &JsValue::from_str("xErrorCode"))
        .ok()
        .and_then(|c| c.as_string().or_else(|| c.as_f64().map(|n| n.to_string())));
    ApiError::from_code(code.as_deref(), describe(&err))
}

fn envelope(raw: JsValue) -> Result<Option<Value>, ApiError> {
    if is_nullish(&raw) {
        return Ok(None);
    }
    from_js::<ApiEnvelope>(raw)
        .map(ApiEnvelope::into_payload)
        .map_err(|e| ApiError::Malformed(e.to_string()))
}

fn to_api_arg<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, ApiError> {
    to_js(value).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait(?Send)]
impl Browser for ChromeHost {
    async fn open_tab(&self, url: &str) {
        log_failure("tabs.create", openTab(url).await);
    }

    async fn send_to_tab(&self, tab_id: i32, message: &StatusMessage) {
        match to_js(message) {
            Ok(js) => log_failure("tabs.sendMessage", sendTabMessage(tab_id, js).await),
            Err(err) => warn!("{}", err),
        }
    }

    async fn set_toolbar_icon(&self, tab_id: i32, saved: bool) {
        log_failure("action.setIcon", setToolbarIcon(tab_id, saved).await);
    }

    async fn close_login_page(&self) {
        log_failure("tabs.remove", closeLoginPage().await);
    }

    async fn remove_all_menus(&self) {
        log_failure("contextMenus.removeAll", removeAllMenus().await);
    }

    async fn create_menu(&self, entry: &MenuEntry) {
        match to_js(entry) {
            Ok(js) => log_failure("contextMenus.create", createMenu(js).await),
            Err(err) => warn!("{}", err),
        }
    }
}

#[async_trait(?Send)]
impl Settings for ChromeHost {
    async fn get(&self, key: SettingKey) -> Option<String> {
        match getSetting(key.as_str()).await {
            Ok(value) => value.as_string(),
            Err(e) => {
                warn!("failed to read setting {}: {}", key.as_str(), describe(&e));
                None
            }
        }
    }

    async fn set(&self, patch: SettingsPatch) -> Result<(), HostError> {
        setSettings(to_js(&patch)?)
            .await
            .map_err(|e| HostError::Browser {
                call: "storage.local.set",
                message: describe(&e),
            })
    }

    async fn clear(&self) -> Result<(), HostError> {
        clearSettings().await.map_err(|e| HostError::Browser {
            call: "storage.local.clear",
            message: describe(&e),
        })
    }
}

#[async_trait(?Send)]
impl PocketApi for ChromeHost {
    async fn get_guid(&self) -> Result<String, ApiError> {
        let guid = getGuid().await.map_err(api_error)?;
        guid.as_string()
            .ok_or_else(|| ApiError::Malformed("guid is not a string".to_string()))
    }

    async fn authorize(&self, guid: &str, payload: &Value) -> Result<AuthResponse, ApiError> {
        let raw = authorize(guid, to_api_arg(payload)?)
            .await
            .map_err(api_error)?;
        from_js(raw).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn save_to_pocket(&self, params: &SaveParams) -> Result<Option<Value>, ApiError> {
        let raw = saveToPocket(to_api_arg(params)?).await.map_err(api_error)?;
        envelope(raw)
    }

    async fn sync_item_tags(
        &self,
        item_id: &str,
        tags: &[String],
        info: &Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let raw = syncItemTags(item_id, to_api_arg(tags)?, to_api_arg(info)?)
            .await
            .map_err(api_error)?;
        envelope(raw)
    }

    async fn remove_item(&self, item_id: &str) -> Result<Option<Value>, ApiError> {
        let raw = removeItem(item_id).await.map_err(api_error)?;
        envelope(raw)
    }
}

#[async_trait(?Send)]
impl SaveHistory for ChromeHost {
    async fn save_success(&self, tab_id: i32, payload: Value) {
        match to_js(&payload) {
            Ok(js) => log_failure("saveSuccess", saveSuccess(tab_id, js).await),
            Err(err) => warn!("{}", err),
        }
    }
}

impl Localizer for ChromeHost {
    fn localize(&self, key: &str) -> String {
        localize(key)
    }
}

impl Diagnostics for ChromeHost {
    fn capture(&self, fingerprint: &str, message: &str) {
        captureError(fingerprint, message);
    }
}

fn load_endpoints(config: JsValue) -> Endpoints {
    if is_nullish(&config) {
        return Endpoints::default();
    }
    from_js(config).unwrap_or_else(|err| {
        warn!("ignoring endpoint overrides: {}", err);
        Endpoints::default()
    })
}

fn spawn_trigger(dispatcher: &Rc<Dispatcher>, trigger: Trigger) {
    let dispatcher = dispatcher.clone();
    spawn_local(async move {
        dispatcher.handle(trigger).await;
    });
}

/// Build the dispatcher and register every browser event listener
pub fn start(config: JsValue) {
    let host = Rc::new(ChromeHost);
    let collaborators = Collaborators {
        browser: host.clone(),
        settings: host.clone(),
        api: host.clone(),
        history: host.clone(),
        localizer: host.clone(),
        diagnostics: host,
    };
    let dispatcher = Rc::new(Dispatcher::new(collaborators, load_endpoints(config)));

    let toolbar = {
        let dispatcher = dispatcher.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |tab: JsValue| match from_js::<TabInfo>(tab) {
            Ok(tab) => spawn_trigger(&dispatcher, Trigger::ToolbarClick(tab)),
            Err(err) => warn!("toolbar click with unreadable tab: {}", err),
        })
    };

    let context = {
        let dispatcher = dispatcher.clone();
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |info: JsValue, tab: JsValue| {
            match (from_js::<ContextClickInfo>(info), from_js::<TabInfo>(tab)) {
                (Ok(info), Ok(tab)) => spawn_trigger(&dispatcher, Trigger::ContextClick { info, tab }),
                (Err(err), _) | (_, Err(err)) => warn!("unreadable context click: {}", err),
            }
        })
    };

    let updated = {
        let dispatcher = dispatcher.clone();
        Closure::<dyn FnMut(i32, JsValue)>::new(move |tab_id: i32, change: JsValue| {
            let change_info = from_js::<ChangeInfo>(change).unwrap_or_default();
            spawn_trigger(&dispatcher, Trigger::TabUpdated { tab_id, change_info });
        })
    };

    let messages = {
        let dispatcher = dispatcher.clone();
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |message: JsValue, sender: JsValue| {
            let message = match from_js::<ContentMessage>(message) {
                Ok(message) => message,
                Err(err) => return warn!("ignoring runtime message: {}", err),
            };
            let tab = js_sys::Reflect::get(&sender, &JsValue::from_str("tab"))
                .ok()
                .filter(|tab| !is_nullish(tab))
                .and_then(|tab| from_js::<TabInfo>(tab).ok());
            spawn_trigger(&dispatcher, Trigger::Message { message, tab });
        })
    };

    let installed = {
        let dispatcher = dispatcher.clone();
        Closure::<dyn FnMut()>::new(move || spawn_trigger(&dispatcher, Trigger::Installed))
    };

    onToolbarClick(toolbar.as_ref().unchecked_ref());
    onContextClick(context.as_ref().unchecked_ref());
    onTabUpdated(updated.as_ref().unchecked_ref());
    onRuntimeMessage(messages.as_ref().unchecked_ref());
    onInstalled(installed.as_ref().unchecked_ref());

    // Listeners live for the whole worker lifetime
    toolbar.forget();
    context.forget();
    updated.forget();
    messages.forget();
    installed.forget();

    info!("background dispatcher started");
}
