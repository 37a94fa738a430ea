//! Data models shared by the analysis service, the local store and the client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---

/// External AI backend selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
}

impl Provider {
    // ---
    /// Resolve a provider label; anything other than `gemini` means OpenAI.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("gemini") => Self::Gemini,
            _ => Self::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }
}

/// Time window of records submitted for analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataScope {
    #[default]
    Today,
    Week,
    Month,
}

impl DataScope {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// How often the user wants analyses to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Hourly,
}

/// Heart-rate range for one day, in BPM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max: f64,
}

/// One calendar day's aggregated vitals and activity figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHealthRecord {
    // ---
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub heart_rate: HeartRate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sleep_hours: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_minutes: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    /// Kilometres.
    #[serde(default, deserialize_with = "null_as_default")]
    pub distance: f64,
}

impl DailyHealthRecord {
    /// An all-zero record for `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            steps: 0.0,
            heart_rate: HeartRate::default(),
            sleep_hours: 0.0,
            active_minutes: 0.0,
            calories: 0.0,
            distance: 0.0,
        }
    }

    /// Overwrite every field the update carries.
    pub fn apply(&mut self, update: &DailyRecordUpdate) {
        // ---
        if let Some(v) = update.steps {
            self.steps = v;
        }
        if let Some(v) = update.heart_rate {
            self.heart_rate = v;
        }
        if let Some(v) = update.sleep_hours {
            self.sleep_hours = v;
        }
        if let Some(v) = update.active_minutes {
            self.active_minutes = v;
        }
        if let Some(v) = update.calories {
            self.calories = v;
        }
        if let Some(v) = update.distance {
            self.distance = v;
        }
    }
}

/// Missing and `null` figures both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial update of a day's record; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordUpdate {
    pub steps: Option<f64>,
    pub heart_rate: Option<HeartRate>,
    pub sleep_hours: Option<f64>,
    pub active_minutes: Option<f64>,
    pub calories: Option<f64>,
    pub distance: Option<f64>,
}

/// Per-metric daily targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthGoals {
    pub steps: u32,
    pub active_minutes: u32,
    pub sleep_hours: f64,
    pub calories: u32,
}

impl Default for HealthGoals {
    fn default() -> Self {
        Self {
            steps: 10_000,
            active_minutes: 30,
            sleep_hours: 8.0,
            calories: 2_000,
        }
    }
}

/// Fraction of each goal reached by a day's record (1.0 = goal met).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub steps: f64,
    pub active_minutes: f64,
    pub sleep: f64,
}

impl HealthGoals {
    pub fn progress(&self, record: &DailyHealthRecord) -> GoalProgress {
        // ---
        fn ratio(value: f64, goal: f64) -> f64 {
            if goal > 0.0 {
                value / goal
            } else {
                0.0
            }
        }

        GoalProgress {
            steps: ratio(record.steps, f64::from(self.steps)),
            active_minutes: ratio(record.active_minutes, f64::from(self.active_minutes)),
            sleep: ratio(record.sleep_hours, self.sleep_hours),
        }
    }
}

/// Recommendation category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sleep,
    Exercise,
    Nutrition,
    #[default]
    General,
}

impl Category {
    /// Parse a label, falling back to `general` for anything unknown.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("sleep") => Self::Sleep,
            Some("exercise") => Self::Exercise,
            Some("nutrition") => Self::Nutrition,
            _ => Self::General,
        }
    }
}

/// Recommendation priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a label, falling back to `medium` for anything unknown.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("high") => Self::High,
            Some("low") => Self::Low,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Successful `POST /api/analyze` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub summary: String,
    pub score: u8,
    pub recommendations: Vec<Recommendation>,
    pub provider: Provider,
    pub analyzed_at: DateTime<Utc>,
}

/// Request body for `POST /api/analyze` as sent by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest<'a> {
    pub provider: Provider,
    pub health_data: &'a [DailyHealthRecord],
    pub data_scope: DataScope,
}

/// A stored analysis; immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub provider: Provider,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
    pub score: u8,
}

/// User preferences for running analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    pub provider: Provider,
    pub frequency: Frequency,
    pub data_scope: DataScope,
    pub last_analysis_time: Option<DateTime<Utc>>,
    pub notifications_enabled: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            frequency: Frequency::Daily,
            data_scope: DataScope::Today,
            last_analysis_time: None,
            notifications_enabled: true,
        }
    }
}

/// Partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub provider: Option<Provider>,
    pub frequency: Option<Frequency>,
    pub data_scope: Option<DataScope>,
    pub last_analysis_time: Option<DateTime<Utc>>,
    pub notifications_enabled: Option<bool>,
}

impl AnalysisSettings {
    pub fn merged(mut self, update: &SettingsUpdate) -> Self {
        // ---
        if let Some(p) = update.provider {
            self.provider = p;
        }
        if let Some(f) = update.frequency {
            self.frequency = f;
        }
        if let Some(s) = update.data_scope {
            self.data_scope = s;
        }
        if let Some(t) = update.last_analysis_time {
            self.last_analysis_time = Some(t);
        }
        if let Some(n) = update.notifications_enabled {
            self.notifications_enabled = n;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_provider_labels() {
        // ---
        assert_eq!(Provider::from_label(Some("gemini")), Provider::Gemini);
        assert_eq!(Provider::from_label(Some("openai")), Provider::OpenAi);
        assert_eq!(Provider::from_label(Some("claude")), Provider::OpenAi);
        assert_eq!(Provider::from_label(None), Provider::OpenAi);
        assert_eq!(serde_json::to_value(Provider::OpenAi).unwrap(), json!("openai"));
    }

    #[test]
    fn test_record_deserializes_camel_case_with_missing_fields() {
        // ---
        let record: DailyHealthRecord = serde_json::from_value(json!({
            "date": "2025-03-26",
            "steps": 8421,
            "heartRate": { "avg": 72, "min": 58, "max": 131 },
            "sleepHours": 7.4
        }))
        .unwrap();

        assert_eq!(record.date, day(2025, 3, 26));
        assert_eq!(record.steps, 8421.0);
        assert_eq!(record.heart_rate.max, 131.0);
        assert_eq!(record.sleep_hours, 7.4);
        assert_eq!(record.active_minutes, 0.0);
        assert_eq!(record.distance, 0.0);
    }

    #[test]
    fn test_record_null_figures_read_as_zero() {
        // ---
        let record: DailyHealthRecord = serde_json::from_value(json!({
            "date": "2025-03-26",
            "steps": null,
            "heartRate": { "avg": null, "min": 58, "max": 131 },
            "sleepHours": 7,
            "calories": null
        }))
        .unwrap();

        assert_eq!(record.steps, 0.0);
        assert_eq!(record.heart_rate.avg, 0.0);
        assert_eq!(record.heart_rate.min, 58.0);
        assert_eq!(record.sleep_hours, 7.0);
        assert_eq!(record.calories, 0.0);

        let no_heart_rate: DailyHealthRecord =
            serde_json::from_value(json!({ "date": "2025-03-26", "heartRate": null })).unwrap();
        assert_eq!(no_heart_rate.heart_rate, HeartRate::default());
    }

    #[test]
    fn test_record_apply_partial_update() {
        // ---
        let mut record = DailyHealthRecord::empty(day(2025, 1, 1));
        record.steps = 5000.0;
        record.calories = 1800.0;

        record.apply(&DailyRecordUpdate {
            steps: Some(6200.0),
            sleep_hours: Some(6.5),
            ..Default::default()
        });

        assert_eq!(record.steps, 6200.0);
        assert_eq!(record.sleep_hours, 6.5);
        assert_eq!(record.calories, 1800.0);
    }

    #[test]
    fn test_goal_progress() {
        // ---
        let goals = HealthGoals::default();
        let mut record = DailyHealthRecord::empty(day(2025, 1, 1));
        record.steps = 5000.0;
        record.active_minutes = 45.0;
        record.sleep_hours = 8.0;

        let progress = goals.progress(&record);
        assert_eq!(progress.steps, 0.5);
        assert_eq!(progress.active_minutes, 1.5);
        assert_eq!(progress.sleep, 1.0);

        let zero_goals = HealthGoals {
            steps: 0,
            ..HealthGoals::default()
        };
        assert_eq!(zero_goals.progress(&record).steps, 0.0);
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        // ---
        let settings: AnalysisSettings =
            serde_json::from_value(json!({ "provider": "gemini" })).unwrap();

        assert_eq!(settings.provider, Provider::Gemini);
        assert_eq!(settings.frequency, Frequency::Daily);
        assert_eq!(settings.data_scope, DataScope::Today);
        assert_eq!(settings.last_analysis_time, None);
        assert!(settings.notifications_enabled);
    }

    #[test]
    fn test_settings_merge_keeps_unset_fields() {
        // ---
        let merged = AnalysisSettings::default().merged(&SettingsUpdate {
            data_scope: Some(DataScope::Month),
            notifications_enabled: Some(false),
            ..Default::default()
        });

        assert_eq!(merged.provider, Provider::OpenAi);
        assert_eq!(merged.data_scope, DataScope::Month);
        assert!(!merged.notifications_enabled);
    }

    #[test]
    fn test_enum_label_fallbacks() {
        // ---
        assert_eq!(Category::from_label(Some("sleep")), Category::Sleep);
        assert_eq!(Category::from_label(Some("mindfulness")), Category::General);
        assert_eq!(Category::from_label(None), Category::General);
        assert_eq!(Priority::from_label(Some("low")), Priority::Low);
        assert_eq!(Priority::from_label(Some("urgent")), Priority::Medium);
        assert_eq!(DataScope::from_label("week"), Some(DataScope::Week));
        assert_eq!(DataScope::from_label("year"), None);
    }
}
