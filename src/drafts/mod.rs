pub mod manager;
pub mod store;
pub mod types;

pub use manager::DraftManager;
pub use store::{DraftStore, SqliteDraftStore, UpdateOutcome};
pub use types::Draft;
