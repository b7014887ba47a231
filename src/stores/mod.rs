pub mod local;
pub mod memory;
pub mod traits;

pub use local::{LocalBlobStore, LocalRecordStore};
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use traits::{BlobStore, RecordStore};
