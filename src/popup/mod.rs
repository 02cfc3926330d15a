//! Popup controller and its outward links

pub mod opener;
pub mod orchestrator;

pub use opener::{LinkOpener, PrintOpener, SaveToDirOpener};
pub use orchestrator::{IDLE_PLACEHOLDER_HTML, LOADING_HTML, Popup, PopupState, error_html};
