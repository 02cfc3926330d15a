//! Summary formatting and display

pub mod formatter;
pub mod reveal;
pub mod surface;

pub use formatter::{Block, EMPTY_SUMMARY_HTML, classify, format_summary};
pub use reveal::{RevealHandle, start_reveal};
pub use surface::{MemorySurface, Surface, TerminalSurface};
