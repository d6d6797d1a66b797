// Merge engine - cross-run snapshot fold and the persisted history store

pub mod engine;
pub mod history;

pub use engine::merge_snapshots;
pub use history::HistoryStore;
