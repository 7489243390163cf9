pub mod medium;
pub mod persistent_store;

pub use medium::{FileMedium, KeyValueMedium, MemoryMedium};
pub use persistent_store::{PersistentStore, Update};
