//! Summarization backend access

pub mod client;

pub use client::{DownloadedFile, SummaryClient, SummaryService};
