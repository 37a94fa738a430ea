//! Local health store.
//!
//! Four independent JSON documents kept in a SQLite key-value table: the
//! daily record history, the goals, the analysis history and the analysis
//! settings. Reads and writes are sequential and the last writer wins.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, warn};

use crate::{
    AnalysisResult, AnalysisSettings, DailyHealthRecord, DailyRecordUpdate, DataScope,
    HealthGoals, Result, SettingsUpdate,
};

mod schema;

pub use schema::create_schema;

/// Number of analyses kept; older ones are evicted on insert.
pub const ANALYSIS_HISTORY_LIMIT: usize = 30;

const KEY_HEALTH_DATA: &str = "health_data";
const KEY_GOALS: &str = "health_goals";
const KEY_ANALYSIS_RESULTS: &str = "analysis_results";
const KEY_ANALYSIS_SETTINGS: &str = "analysis_settings";

// ---

#[derive(Debug, Clone)]
pub struct HealthStorage {
    pool: SqlitePool,
}

impl HealthStorage {
    /// Open (creating if needed) the store at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        // ---
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    /// A private in-memory store, gone when the value is dropped.
    pub async fn in_memory() -> Result<Self> {
        // ---
        // Every SQLite memory connection is its own database, so pin one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_schema(&pool).await?;
        Ok(Self { pool })
    }

    // --- daily records

    /// All stored daily records, oldest first.
    pub async fn health_data(&self) -> Result<Vec<DailyHealthRecord>> {
        self.read_or_default(KEY_HEALTH_DATA).await
    }

    /// Replace the record history. Duplicate dates collapse to the last one given.
    pub async fn save_health_data(&self, records: &[DailyHealthRecord]) -> Result<()> {
        // ---
        let by_date: BTreeMap<NaiveDate, &DailyHealthRecord> =
            records.iter().map(|r| (r.date, r)).collect();
        let unique: Vec<&DailyHealthRecord> = by_date.into_values().collect();

        if unique.len() != records.len() {
            debug!(
                "Collapsed {} duplicate-date record(s)",
                records.len() - unique.len()
            );
        }
        self.write(KEY_HEALTH_DATA, &unique).await
    }

    pub async fn day_data(&self, date: NaiveDate) -> Result<Option<DailyHealthRecord>> {
        Ok(self
            .health_data()
            .await?
            .into_iter()
            .find(|r| r.date == date))
    }

    pub async fn today_data(&self) -> Result<Option<DailyHealthRecord>> {
        self.day_data(Utc::now().date_naive()).await
    }

    /// Merge `update` into the record for `date`, starting from zeros if none exists.
    pub async fn update_day(
        &self,
        date: NaiveDate,
        update: &DailyRecordUpdate,
    ) -> Result<DailyHealthRecord> {
        // ---
        let mut records = self.health_data().await?;
        let record = match records.iter().position(|r| r.date == date) {
            Some(i) => {
                records[i].apply(update);
                records[i].clone()
            }
            None => {
                let mut fresh = DailyHealthRecord::empty(date);
                fresh.apply(update);
                records.push(fresh.clone());
                fresh
            }
        };

        self.save_health_data(&records).await?;
        Ok(record)
    }

    pub async fn update_today(&self, update: &DailyRecordUpdate) -> Result<DailyHealthRecord> {
        self.update_day(Utc::now().date_naive(), update).await
    }

    /// Records inside the scope's window ending at `today`.
    ///
    /// `today` matches the date exactly; `week` and `month` are the last 7
    /// and 30 calendar days, `today` included.
    pub async fn records_for_scope(
        &self,
        scope: DataScope,
        today: NaiveDate,
    ) -> Result<Vec<DailyHealthRecord>> {
        // ---
        let records = self.health_data().await?;
        let since = |days: u64| today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);

        let selected = match scope {
            DataScope::Today => records.into_iter().filter(|r| r.date == today).collect(),
            DataScope::Week => {
                let from = since(6);
                records.into_iter().filter(|r| r.date >= from).collect()
            }
            DataScope::Month => {
                let from = since(29);
                records.into_iter().filter(|r| r.date >= from).collect()
            }
        };
        Ok(selected)
    }

    // --- goals

    pub async fn goals(&self) -> Result<HealthGoals> {
        self.read_or_default(KEY_GOALS).await
    }

    pub async fn save_goals(&self, goals: &HealthGoals) -> Result<()> {
        self.write(KEY_GOALS, goals).await
    }

    // --- analysis history

    /// Stored analyses, most recent first.
    pub async fn analysis_results(&self) -> Result<Vec<AnalysisResult>> {
        self.read_or_default(KEY_ANALYSIS_RESULTS).await
    }

    /// Prepend `result`, evicting the oldest entries beyond the history limit.
    pub async fn save_analysis_result(&self, result: &AnalysisResult) -> Result<()> {
        // ---
        let mut results = self.analysis_results().await?;
        results.insert(0, result.clone());
        results.truncate(ANALYSIS_HISTORY_LIMIT);
        self.write(KEY_ANALYSIS_RESULTS, &results).await
    }

    // --- settings

    /// Stored settings merged over the defaults.
    pub async fn settings(&self) -> Result<AnalysisSettings> {
        self.read_or_default(KEY_ANALYSIS_SETTINGS).await
    }

    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<AnalysisSettings> {
        // ---
        let merged = self.settings().await?.merged(update);
        self.write(KEY_ANALYSIS_SETTINGS, &merged).await?;
        Ok(merged)
    }

    /// Remove every stored document.
    pub async fn clear_all(&self) -> Result<()> {
        // ---
        sqlx::query("DELETE FROM kv_store WHERE key IN (?1, ?2, ?3, ?4)")
            .bind(KEY_HEALTH_DATA)
            .bind(KEY_GOALS)
            .bind(KEY_ANALYSIS_RESULTS)
            .bind(KEY_ANALYSIS_SETTINGS)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- raw access

    async fn read_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        // ---
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(raw) = raw else {
            return Ok(T::default());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Unreadable value under '{}', using defaults: {}", key, e);
            T::default()
        }))
    }

    async fn write<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        // ---
        let json = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[cfg(test)]
    async fn write_raw(&self, key: &str, raw: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(raw)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
