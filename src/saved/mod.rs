pub mod storage;
pub mod types;

pub use storage::{get_store_path, load_store, save_store};
pub use types::{CalculationData, SavedCalculation, SavedStore, StoreError, MAX_SAVED_PER_ACCOUNT};
