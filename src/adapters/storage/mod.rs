// Storage backends for the property/client repositories.

mod file;
mod local;
mod memory;

pub use file::{FileStore, DEFAULT_SNAPSHOT_FILE};
pub use local::LocalStorage;
pub use memory::{MemoryStore, Snapshot};
