/// Save panel injected into the page

use std::rc::Rc;

use log::warn;
use patternfly_yew::prelude::*;
use serde_json::{Map, json};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlInputElement, MediaQueryListEvent};
use yew::prelude::*;

use crate::actions::{ContentMessage, RemovePayload, StatusMessage, TagSyncPayload};
use crate::content::{
    add_runtime_listener, dark_scheme_query, post, prefers_dark, remove_runtime_listener,
};
use crate::js::from_js;
use crate::ui::state::{
    PanelState, SaveStatus, TagStatus, merge_tags, theme_class, validate_tags,
};

pub enum PanelAction {
    Status(StatusMessage),
    Dismiss,
}

impl Reducible for PanelState {
    type Action = PanelAction;

    fn reduce(self: Rc<Self>, action: PanelAction) -> Rc<Self> {
        match action {
            PanelAction::Status(message) => Rc::new(self.apply(&message)),
            PanelAction::Dismiss => Rc::new(self.dismissed()),
        }
    }
}

#[function_component(SavePanel)]
pub fn save_panel() -> Html {
    let state = use_reducer(PanelState::saving);
    let tag_input = use_state(String::new);
    let dark = use_state(prefers_dark);

    // Follow status messages for as long as the panel is mounted
    {
        let dispatcher = state.dispatcher();
        use_effect_with((), move |_| {
            let listener = Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
                if let Ok(status) = from_js::<StatusMessage>(message) {
                    dispatcher.dispatch(PanelAction::Status(status));
                }
            });
            add_runtime_listener(listener.as_ref().unchecked_ref());

            move || {
                remove_runtime_listener(listener.as_ref().unchecked_ref());
                drop(listener);
            }
        });
    }

    // Re-theme when the page's color scheme flips while the panel is open
    {
        let dark = dark.setter();
        use_effect_with((), move |_| {
            let query = dark_scheme_query();
            let on_change = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
                move |event: MediaQueryListEvent| dark.set(event.matches()),
            );
            if let Some(mql) = &query {
                if let Err(e) = mql
                    .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
                {
                    warn!("failed to watch color scheme: {:?}", e);
                }
            }

            move || {
                if let Some(mql) = &query {
                    let _ = mql.remove_event_listener_with_callback(
                        "change",
                        on_change.as_ref().unchecked_ref(),
                    );
                }
                drop(on_change);
            }
        });
    }

    let on_tag_input = {
        let tag_input = tag_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                tag_input.set(input.value());
            }
        })
    };

    let on_add_tags = {
        let state = state.clone();
        let tag_input = tag_input.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(item_id) = state.item_id.clone() else {
                return;
            };

            match validate_tags(&tag_input) {
                Ok(added) => {
                    post(&ContentMessage::TagsSync(TagSyncPayload {
                        item_id,
                        tags: merge_tags(&state.tags, &added),
                        rest: Map::new(),
                    }));
                    tag_input.set(String::new());
                }
                Err(err) => post(&ContentMessage::UpdateTagError(json!(err.to_string()))),
            }
        })
    };

    let on_remove = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(item_id) = state.item_id.clone() {
                post(&ContentMessage::RemoveItem(RemovePayload {
                    item_id,
                    rest: Map::new(),
                }));
            }
        })
    };

    let on_close = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(PanelAction::Dismiss))
    };

    if !state.visible {
        return html! {};
    }

    let busy = matches!(state.status, SaveStatus::Saving | SaveStatus::Removing)
        || state.tag_status == TagStatus::Syncing;

    html! {
        <div class={classes!("pocket-panel", theme_class(*dark))}>
            {match state.status {
                SaveStatus::Idle => html! {},
                SaveStatus::Saving => html! {
                    <div class="pocket-panel-status">
                        <Spinner />
                        <p class="loading-text">{"Saving..."}</p>
                    </div>
                },
                SaveStatus::Saved => html! {
                    <Alert r#type={AlertType::Success} title={"Saved to Pocket"} inline={true}>
                    </Alert>
                },
                SaveStatus::SaveFailed => html! {
                    <Alert r#type={AlertType::Danger} title={"Something went wrong"} inline={true}>
                        {"This page could not be saved."}
                    </Alert>
                },
                SaveStatus::Removing => html! {
                    <div class="pocket-panel-status">
                        <Spinner />
                        <p class="loading-text">{"Removing..."}</p>
                    </div>
                },
                SaveStatus::Removed => html! {
                    <Alert r#type={AlertType::Info} title={"Removed from Pocket"} inline={true}>
                    </Alert>
                },
                SaveStatus::RemoveFailed => html! {
                    <Alert r#type={AlertType::Danger} title={"Could not remove item"} inline={true}>
                    </Alert>
                },
            }}

            if state.can_edit() {
                <div class="pocket-panel-tags">
                    <div class="tag-list">
                        {for state.tags.iter().map(|tag| html! {
                            <span key={tag.clone()} class="tag-chip">{tag}</span>
                        })}
                    </div>
                    <input
                        type="text"
                        class="tag-input"
                        placeholder="Add tags, separated by commas"
                        value={(*tag_input).clone()}
                        oninput={on_tag_input}
                        disabled={busy}
                    />
                    <div class="pocket-panel-actions">
                        <Button onclick={on_add_tags} disabled={busy} variant={ButtonVariant::Secondary}>
                            {"Save tags"}
                        </Button>
                        <Button onclick={on_remove} disabled={busy} variant={ButtonVariant::Danger}>
                            {"Remove"}
                        </Button>
                    </div>
                </div>
            }

            {match &state.tag_status {
                TagStatus::Invalid(message) => html! {
                    <Alert r#type={AlertType::Warning} title={message.clone()} inline={true}>
                    </Alert>
                },
                TagStatus::Failed => html! {
                    <Alert r#type={AlertType::Danger} title={"Tags could not be saved"} inline={true}>
                    </Alert>
                },
                TagStatus::Syncing => html! { <p class="loading-text">{"Saving tags..."}</p> },
                TagStatus::Synced | TagStatus::Idle => html! {},
            }}

            <Button onclick={on_close} variant={ButtonVariant::Link}>
                {"Close"}
            </Button>
        </div>
    }
}
