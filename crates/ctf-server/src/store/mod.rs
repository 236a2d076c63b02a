//! Document storage
//!
//! CRUD access to CTFs, challenges and flag submissions over the shared
//! SQLite pool. Parent ids are soft references: only flag submission checks
//! that its challenge exists, and nothing cascades on delete.

mod challenges;
mod ctfs;
mod flags;

use sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) async fn memory_store() -> DocumentStore {
    let db = crate::db::Database::in_memory().await.unwrap();
    DocumentStore::new(db.pool().clone())
}
