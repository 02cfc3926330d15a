//! Local persistence of the last summary

pub mod store;

pub use store::{FileStore, MemoryStore, SAVED_SUMMARY_KEY, SummaryStore};
