//! Client side of the analysis flow.
//!
//! Selects stored records for a scope, asks the service for an analysis and
//! records the outcome locally. A failed request never surfaces to the caller
//! as an error: a canned result is stored in its place.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ErrorBody;
use crate::storage::HealthStorage;
use crate::{
    AnalysisResult, AnalyzeRequest, AnalyzeResponse, AppError, Category, DailyHealthRecord,
    DataScope, Frequency, Priority, Provider, Recommendation, Result, SettingsUpdate,
};

/// Score attached to the canned fallback result.
pub const FALLBACK_SCORE: u8 = 80;

// ---

/// What the user picked before starting an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub provider: Provider,
    pub frequency: Frequency,
    pub data_scope: DataScope,
}

/// A stored analysis and whether it came from the fallback path.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub used_fallback: bool,
}

pub struct AnalysisClient {
    http: Client,
    api_url: String,
    storage: HealthStorage,
    in_flight: AtomicBool,
}

impl AnalysisClient {
    pub fn new(api_url: impl Into<String>, storage: HealthStorage) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            storage,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Open the configured store and point at the configured service.
    pub async fn from_config(cfg: &ClientConfig) -> Result<Self> {
        // ---
        let storage = HealthStorage::connect(&cfg.store_url, cfg.store_pool_max).await?;
        Ok(Self::new(cfg.api_url.clone(), storage))
    }

    pub fn storage(&self) -> &HealthStorage {
        &self.storage
    }

    /// True while `run_analysis` is outstanding.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Post a batch to `/api/analyze`.
    ///
    /// Non-2xx responses become [`AppError::Upstream`] carrying the server's message.
    pub async fn request_analysis(
        &self,
        provider: Provider,
        data_scope: DataScope,
        health_data: &[DailyHealthRecord],
    ) -> Result<AnalyzeResponse> {
        // ---
        let url = format!("{}/api/analyze", self.api_url.trim_end_matches('/'));
        let body = AnalyzeRequest {
            provider,
            health_data,
            data_scope,
        };

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<AnalyzeResponse>().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => format!("Analysis request failed with status {}", status),
        };
        Err(AppError::upstream(message))
    }

    /// Run one analysis end to end and store the result.
    ///
    /// Only one analysis may be outstanding; a second call while one runs
    /// returns [`AppError::AnalysisInProgress`]. Service failures are replaced
    /// by [`fallback_result`]; storage failures are returned.
    pub async fn run_analysis(&self, options: AnalysisOptions) -> Result<AnalysisOutcome> {
        // ---
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(AppError::AnalysisInProgress)?;

        let today = Utc::now().date_naive();
        let records = self
            .storage
            .records_for_scope(options.data_scope, today)
            .await?;
        info!(
            "Requesting {} analysis of {} record(s) ({})",
            options.provider.display_name(),
            records.len(),
            options.data_scope.as_str()
        );

        let (result, used_fallback) = match self
            .request_analysis(options.provider, options.data_scope, &records)
            .await
        {
            Ok(response) => (
                AnalysisResult {
                    id: Uuid::new_v4().to_string(),
                    provider: options.provider,
                    timestamp: Utc::now(),
                    summary: response.summary,
                    recommendations: response.recommendations,
                    score: response.score,
                },
                false,
            ),
            Err(e) => {
                warn!("Analysis failed, storing fallback result: {}", e);
                (fallback_result(options.provider, Utc::now()), true)
            }
        };

        self.storage.save_analysis_result(&result).await?;
        self.storage
            .save_settings(&SettingsUpdate {
                provider: Some(options.provider),
                frequency: Some(options.frequency),
                data_scope: Some(options.data_scope),
                last_analysis_time: Some(Utc::now()),
                notifications_enabled: None,
            })
            .await?;

        Ok(AnalysisOutcome {
            result,
            used_fallback,
        })
    }
}

/// Canned analysis shown when the service cannot be reached or fails.
pub fn fallback_result(provider: Provider, now: DateTime<Utc>) -> AnalysisResult {
    // ---
    AnalysisResult {
        id: Uuid::new_v4().to_string(),
        provider,
        timestamp: now,
        summary: "Based on your health data, you're making good progress toward your fitness goals. \
                  Your step count shows consistent activity, and your sleep patterns are within healthy ranges."
            .to_string(),
        recommendations: vec![
            Recommendation {
                category: Category::Exercise,
                title: "Increase Daily Steps".to_string(),
                description: "Try to add 1,000 more steps to your daily routine by taking short walks after meals."
                    .to_string(),
                priority: Priority::Medium,
            },
            Recommendation {
                category: Category::Sleep,
                title: "Maintain Sleep Schedule".to_string(),
                description: "Your sleep duration is good. Keep consistent bedtimes to optimize rest quality."
                    .to_string(),
                priority: Priority::Low,
            },
            Recommendation {
                category: Category::Nutrition,
                title: "Stay Hydrated".to_string(),
                description: "Based on your activity level, aim for 8-10 glasses of water daily."
                    .to_string(),
                priority: Priority::High,
            },
        ],
        score: FALLBACK_SCORE,
    }
}

/// Holds the in-flight flag for the duration of one analysis.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
