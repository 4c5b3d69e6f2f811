//! Feature repository: persistence and lookup for session feature rows.
//!
//! External: SQLite via sqlx. The aggregation pipeline calls `replace_all`
//! after every run (full overwrite, not append); the message path calls
//! `get_features` to look up one session group.

use std::str::FromStr;

use coach_core::SessionFeatureRow;
use tracing::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::error::StorageError;

#[derive(Clone)]
pub struct FeatureRepository {
    pool: SqlitePool,
}

impl FeatureRepository {
    /// Opens (creating if missing) the feature database at `database_url`
    /// (a file path, `sqlite:` URL, or `sqlite::memory:`).
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        info!("Initializing feature store: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        // No primary key on session_group: one row per group is the expected
        // shape, but the schema permits more and get_features returns all.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_features (
                session_group TEXT NOT NULL,
                patient_id TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                pain INTEGER NOT NULL,
                fatigue INTEGER NOT NULL,
                quality INTEGER NOT NULL,
                session_is_nok INTEGER NOT NULL,
                leave_session TEXT,
                quality_reason_other INTEGER NOT NULL,
                quality_reason_exercises INTEGER NOT NULL,
                prescribed_repeats INTEGER NOT NULL,
                training_time INTEGER NOT NULL,
                perc_correct_repeats REAL,
                number_exercises INTEGER NOT NULL,
                number_of_distinct_exercises INTEGER NOT NULL,
                exercise_with_most_incorrect TEXT NOT NULL,
                first_exercise_skipped TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_features_group
             ON session_features(session_group)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the whole store with `features` in one transaction.
    pub async fn replace_all(&self, features: &[SessionFeatureRow]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM session_features")
            .execute(&mut *tx)
            .await?;

        for feature in features {
            sqlx::query(
                r#"
                INSERT INTO session_features (
                    session_group, patient_id, patient_name, pain, fatigue,
                    quality, session_is_nok, leave_session,
                    quality_reason_other, quality_reason_exercises,
                    prescribed_repeats, training_time, perc_correct_repeats,
                    number_exercises, number_of_distinct_exercises,
                    exercise_with_most_incorrect, first_exercise_skipped
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&feature.session_group)
            .bind(&feature.patient_id)
            .bind(&feature.patient_name)
            .bind(feature.pain)
            .bind(feature.fatigue)
            .bind(feature.quality)
            .bind(feature.session_is_nok)
            .bind(&feature.leave_session)
            .bind(feature.quality_reason_other)
            .bind(feature.quality_reason_exercises)
            .bind(feature.prescribed_repeats)
            .bind(feature.training_time)
            .bind(feature.perc_correct_repeats)
            .bind(feature.number_exercises)
            .bind(feature.number_of_distinct_exercises)
            .bind(&feature.exercise_with_most_incorrect)
            .bind(&feature.first_exercise_skipped)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Replaced feature store with {} rows", features.len());
        Ok(())
    }

    /// Returns every feature row for `session_group` (0 or 1 in current
    /// usage). An unknown group yields an empty vec, not an error.
    pub async fn get_features(
        &self,
        session_group: &str,
    ) -> Result<Vec<SessionFeatureRow>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM session_features WHERE session_group = ?",
        )
        .bind(session_group)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(feature_from_row).collect()
    }
}

fn feature_from_row(row: &SqliteRow) -> Result<SessionFeatureRow, StorageError> {
    Ok(SessionFeatureRow {
        session_group: row.try_get("session_group")?,
        patient_id: row.try_get("patient_id")?,
        patient_name: row.try_get("patient_name")?,
        pain: row.try_get("pain")?,
        fatigue: row.try_get("fatigue")?,
        quality: row.try_get("quality")?,
        session_is_nok: row.try_get("session_is_nok")?,
        leave_session: row.try_get("leave_session")?,
        quality_reason_other: row.try_get("quality_reason_other")?,
        quality_reason_exercises: row.try_get("quality_reason_exercises")?,
        prescribed_repeats: row.try_get("prescribed_repeats")?,
        training_time: row.try_get("training_time")?,
        perc_correct_repeats: row.try_get("perc_correct_repeats")?,
        number_exercises: row.try_get("number_exercises")?,
        number_of_distinct_exercises: row.try_get("number_of_distinct_exercises")?,
        exercise_with_most_incorrect: row.try_get("exercise_with_most_incorrect")?,
        first_exercise_skipped: row.try_get("first_exercise_skipped")?,
    })
}
