use chrono::Utc;
use tracing::info;

use super::{new_id, DocumentStore};
use crate::error::{ApiError, Result};
use crate::models::{FlagSubmission, NewFlagSubmission};

const FLAG_COLUMNS: &str =
    "id, challenge_id, user_id, flag_text, note, is_correct, created_at, updated_at";

impl DocumentStore {
    /// Submissions for one challenge, newest first
    pub async fn list_flags(&self, challenge_id: &str) -> Result<Vec<FlagSubmission>> {
        let flags = sqlx::query_as::<_, FlagSubmission>(&format!(
            "SELECT {} FROM flag_submissions WHERE challenge_id = ? ORDER BY created_at DESC, rowid DESC",
            FLAG_COLUMNS
        ))
        .bind(challenge_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(flags)
    }

    pub async fn get_flag(&self, id: &str) -> Result<Option<FlagSubmission>> {
        let flag = sqlx::query_as::<_, FlagSubmission>(&format!(
            "SELECT {} FROM flag_submissions WHERE id = ?",
            FLAG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flag)
    }

    /// Record a submission. The referenced challenge must exist right now;
    /// new submissions always start out incorrect.
    pub async fn create_flag(&self, new: NewFlagSubmission) -> Result<FlagSubmission> {
        if !self.challenge_exists(&new.challenge_id).await? {
            return Err(ApiError::NotFound("Challenge not found".into()));
        }

        let now = Utc::now();
        let flag = sqlx::query_as::<_, FlagSubmission>(&format!(
            "INSERT INTO flag_submissions (id, challenge_id, user_id, flag_text, note, is_correct, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?, ?) RETURNING {}",
            FLAG_COLUMNS
        ))
        .bind(new_id())
        .bind(&new.challenge_id)
        .bind(&new.user_id)
        .bind(&new.flag_text)
        .bind(&new.note)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "[Store] Flag submitted by {} for challenge {}",
            flag.user_id, flag.challenge_id
        );
        Ok(flag)
    }

    /// Set `is_correct` and return the updated submission, if it exists.
    pub async fn set_flag_correct(
        &self,
        id: &str,
        is_correct: bool,
    ) -> Result<Option<FlagSubmission>> {
        let flag = sqlx::query_as::<_, FlagSubmission>(&format!(
            "UPDATE flag_submissions SET is_correct = ?, updated_at = ? WHERE id = ? RETURNING {}",
            FLAG_COLUMNS
        ))
        .bind(is_correct)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(flag) = &flag {
            info!("[Store] Flag {} marked is_correct={}", flag.id, flag.is_correct);
        }
        Ok(flag)
    }

    pub async fn delete_flag(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM flag_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
