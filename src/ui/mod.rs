/// UI module exports
pub mod panel;
pub mod state;
