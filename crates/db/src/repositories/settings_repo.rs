//! Repository for the `quiz_settings` key/value table.

use sqlx::PgPool;

use crate::models::setting::SettingRow;

pub struct SettingsRepo;

impl SettingsRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<SettingRow>, sqlx::Error> {
        sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, updated_at FROM quiz_settings ORDER BY key ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Upsert every pair in a single transaction.
    pub async fn upsert_many(pool: &PgPool, pairs: &[(&str, String)]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for (key, value) in pairs {
            sqlx::query(
                "INSERT INTO quiz_settings (key, value, updated_at) VALUES ($1, $2, NOW()) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}
