pub mod history;
pub mod import;
pub mod models;
pub mod prize;

pub use history::{DrawHistory, HistoryError};
pub use models::{Combination, CombinationError, DrawRecord, MAX_NUMBER, PICK_COUNT};
pub use prize::PrizeTier;
