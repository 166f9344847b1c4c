/// Content script entry: mounts the save panel on demand and keeps the
/// background informed of the page's color scheme.
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{MediaQueryList, MediaQueryListEvent, Window};

use crate::actions::{ColorModePayload, ContentMessage, StatusMessage};
use crate::error::HostError;
use crate::injector::{DARK_SCHEME_QUERY, InitPlan, PageHost, PageInjector, ROOT_ID, init_plan};
use crate::js::{from_js, to_js};
use crate::ui::panel::SavePanel;

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    #[wasm_bindgen(js_name = sendRuntimeMessage)]
    pub(crate) fn send_runtime_message(message: JsValue);

    #[wasm_bindgen(js_name = addRuntimeListener)]
    pub(crate) fn add_runtime_listener(callback: &js_sys::Function);

    #[wasm_bindgen(js_name = removeRuntimeListener)]
    pub(crate) fn remove_runtime_listener(callback: &js_sys::Function);
}

/// Send a message to the background, logging anything that can't be encoded
pub(crate) fn post(message: &ContentMessage) {
    match to_js(message) {
        Ok(js) => send_runtime_message(js),
        Err(err) => warn!("failed to encode {:?}: {}", message, err),
    }
}

pub(crate) fn dark_scheme_query() -> Option<MediaQueryList> {
    web_sys::window().and_then(|window| window.match_media(DARK_SCHEME_QUERY).ok().flatten())
}

/// Current value of the dark color-scheme media query
pub(crate) fn prefers_dark() -> bool {
    dark_scheme_query().is_some_and(|mql| mql.matches())
}

/// The live page document
struct DomPage;

impl PageHost for DomPage {
    fn mount_root(&self) -> Result<(), HostError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| dom_error("window.document", "no document"))?;
        let body = document
            .body()
            .ok_or_else(|| dom_error("document.body", "no body"))?;

        let root = document
            .create_element("div")
            .map_err(|e| dom_error("document.createElement", &format!("{:?}", e)))?;
        root.set_id(ROOT_ID);
        body.append_child(&root)
            .map_err(|e| dom_error("body.appendChild", &format!("{:?}", e)))?;

        yew::Renderer::<SavePanel>::with_root(root).render();
        debug!("save panel mounted");
        Ok(())
    }

    fn report_color_mode(&self, dark_mode: bool) {
        post(&ContentMessage::ColorModeChange(ColorModePayload { dark_mode }));
    }
}

fn dom_error(call: &'static str, message: &str) -> HostError {
    HostError::Browser {
        call,
        message: message.to_string(),
    }
}

fn is_top_frame(window: &Window) -> bool {
    window
        .top()
        .ok()
        .flatten()
        .is_some_and(|top| js_sys::Object::is(&top, window))
}

fn initialize(window: &Window) {
    let injector = Rc::new(PageInjector::new(DomPage));

    let on_message = {
        let injector = injector.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            if let Ok(status) = from_js::<StatusMessage>(message) {
                injector.on_status(&status);
            }
        })
    };
    add_runtime_listener(on_message.as_ref().unchecked_ref());
    on_message.forget();

    match window.match_media(DARK_SCHEME_QUERY) {
        Ok(Some(mql)) => {
            injector.color_mode_changed(mql.matches());

            let on_change = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
                move |event: MediaQueryListEvent| injector.color_mode_changed(event.matches()),
            );
            if let Err(e) =
                mql.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            {
                warn!("failed to watch color scheme: {:?}", e);
            }
            on_change.forget();
        }
        Ok(None) => debug!("color scheme media query unsupported"),
        Err(e) => warn!("failed to query color scheme: {:?}", e),
    }
}

pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let loading = document.ready_state() == "loading";
    match init_plan(is_top_frame(&window), loading) {
        InitPlan::Skip => {}
        InitPlan::Now => initialize(&window),
        InitPlan::OnDomContentLoaded => {
            let deferred = {
                let window = window.clone();
                Closure::once_into_js(move || initialize(&window))
            };
            if let Err(e) = document
                .add_event_listener_with_callback("DOMContentLoaded", deferred.unchecked_ref())
            {
                warn!("failed to defer initialization: {:?}", e);
            }
        }
    }
}
