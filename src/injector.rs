/// Page injector: mounts the save panel into the page at most once and
/// reports the color scheme upstream.
use std::cell::Cell;

use log::{debug, warn};

use crate::actions::StatusMessage;
use crate::error::HostError;

/// Id of the element the panel is mounted into
pub const ROOT_ID: &str = "pocket-extension-root";

pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// DOM and messaging side of the content script
pub trait PageHost {
    fn mount_root(&self) -> Result<(), HostError>;
    fn report_color_mode(&self, dark_mode: bool);
}

/// When the content script should set itself up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPlan {
    Now,
    OnDomContentLoaded,
    Skip,
}

/// Only the top frame initializes, and not before the document has loaded.
pub fn init_plan(is_top_frame: bool, document_loading: bool) -> InitPlan {
    match (is_top_frame, document_loading) {
        (false, _) => InitPlan::Skip,
        (true, true) => InitPlan::OnDomContentLoaded,
        (true, false) => InitPlan::Now,
    }
}

pub struct PageInjector<H: PageHost> {
    host: H,
    mounted: Cell<bool>,
}

impl<H: PageHost> PageInjector<H> {
    pub fn new(host: H) -> Self {
        PageInjector {
            host,
            mounted: Cell::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Only a save request mounts the panel. Later messages are picked up by
    /// the mounted panel itself.
    pub fn on_status(&self, message: &StatusMessage) {
        if matches!(message, StatusMessage::SaveToPocketRequest) {
            self.inject();
        }
    }

    pub fn inject(&self) {
        if self.mounted.get() {
            debug!("save panel already mounted");
            return;
        }

        match self.host.mount_root() {
            Ok(()) => self.mounted.set(true),
            Err(err) => warn!("failed to mount save panel: {}", err),
        }
    }

    pub fn color_mode_changed(&self, dark_mode: bool) {
        self.host.report_color_mode(dark_mode);
    }
}
