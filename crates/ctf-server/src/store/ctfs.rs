use chrono::Utc;
use tracing::info;

use super::{new_id, DocumentStore};
use crate::error::Result;
use crate::models::{Ctf, NewCtf};

const CTF_COLUMNS: &str = "id, name, created_at, updated_at";

impl DocumentStore {
    /// All CTFs, newest first
    pub async fn list_ctfs(&self) -> Result<Vec<Ctf>> {
        let ctfs = sqlx::query_as::<_, Ctf>(&format!(
            "SELECT {} FROM ctfs ORDER BY created_at DESC, rowid DESC",
            CTF_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(ctfs)
    }

    pub async fn get_ctf(&self, id: &str) -> Result<Option<Ctf>> {
        let ctf = sqlx::query_as::<_, Ctf>(&format!(
            "SELECT {} FROM ctfs WHERE id = ?",
            CTF_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ctf)
    }

    pub async fn create_ctf(&self, new: NewCtf) -> Result<Ctf> {
        let now = Utc::now();
        let ctf = sqlx::query_as::<_, Ctf>(&format!(
            "INSERT INTO ctfs (id, name, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING {}",
            CTF_COLUMNS
        ))
        .bind(new_id())
        .bind(&new.name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!("[Store] CTF created: {} ({})", ctf.name, ctf.id);
        Ok(ctf)
    }

    /// Delete a CTF. Its challenges are left untouched.
    pub async fn delete_ctf(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ctfs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
