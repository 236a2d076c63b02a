use chrono::Utc;
use tracing::info;

use super::{new_id, DocumentStore};
use crate::error::Result;
use crate::models::{Challenge, NewChallenge};

const CHALLENGE_COLUMNS: &str =
    "id, ctf_id, title, description, category, file_url, created_at, updated_at";

impl DocumentStore {
    /// Challenges of one CTF, newest first. The CTF itself need not exist.
    pub async fn list_challenges(&self, ctf_id: &str) -> Result<Vec<Challenge>> {
        let challenges = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {} FROM challenges WHERE ctf_id = ? ORDER BY created_at DESC, rowid DESC",
            CHALLENGE_COLUMNS
        ))
        .bind(ctf_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(challenges)
    }

    pub async fn get_challenge(&self, id: &str) -> Result<Option<Challenge>> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {} FROM challenges WHERE id = ?",
            CHALLENGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    pub async fn challenge_exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM challenges WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge> {
        let now = Utc::now();
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "INSERT INTO challenges (id, ctf_id, title, description, category, file_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            CHALLENGE_COLUMNS
        ))
        .bind(new_id())
        .bind(&new.ctf_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.category)
        .bind(&new.file_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "[Store] Challenge created: {} [{}] in CTF {}",
            challenge.title, challenge.category, challenge.ctf_id
        );
        Ok(challenge)
    }

    /// Delete a challenge. Its submissions and attachment are left untouched.
    pub async fn delete_challenge(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM challenges WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
