//! `vitals-insight`: health summary analysis proxy and local health store.
//!
//! The service side accepts a batch of daily health records on
//! `POST /api/analyze`, summarizes them, asks OpenAI or Gemini for an
//! assessment and reshapes the answer into a fixed contract. The client side
//! keeps records, goals, settings and past analyses in a local SQLite store
//! and drives the analysis flow with a canned fallback on failure.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! sibling modules import shared types from the crate root only.

pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod storage;
pub mod summary;

pub use config::{ClientConfig, Config};
pub use error::{AppError, Result};

// Re-exported so modules depend on the crate root rather than on `models`.
pub use models::{
    AnalysisResult, AnalysisSettings, AnalyzeRequest, AnalyzeResponse, Category,
    DailyHealthRecord, DailyRecordUpdate, DataScope, Frequency, GoalProgress, HealthGoals,
    HeartRate, Priority, Provider, Recommendation, SettingsUpdate,
};
