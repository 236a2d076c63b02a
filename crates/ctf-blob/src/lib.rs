//! Chunked binary object storage for challenge attachments.
//!
//! Objects live in two tables of the application database: one metadata row
//! per object and one row per fixed-size payload chunk. Reads and writes move
//! one chunk at a time, so memory use does not grow with object size.

mod error;
mod store;

pub use error::{BlobError, Result};
pub use store::{
    ChunkStream, ObjectMeta, ObjectStore, StoredObject, DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_TYPE,
};
