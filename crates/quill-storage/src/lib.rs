// Storage layer for the quill blog backend
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// The API crate talks to `StorageBackend`, which dispatches to either the
// sqlx-backed `Database` or `InMemoryDatabase`.

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::{Database, PoolConfig};
