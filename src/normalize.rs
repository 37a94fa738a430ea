//! Reshape whatever JSON the model returned into the fixed analysis contract.
//!
//! Nothing here fails: every missing or out-of-range field is replaced by a
//! default so the caller always gets a well-formed [`AnalyzeResponse`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{AnalyzeResponse, Category, Priority, Provider, Recommendation};

pub const DEFAULT_SCORE: u8 = 75;
pub const MAX_RECOMMENDATIONS: usize = 4;

const DEFAULT_SUMMARY: &str = "Analysis complete.";
const DEFAULT_TITLE: &str = "Health Tip";
const DEFAULT_DESCRIPTION: &str = "Maintain healthy habits.";

// ---

/// Build the response contract from a raw model payload.
pub fn normalize_analysis(
    raw: &Value,
    provider: Provider,
    analyzed_at: DateTime<Utc>,
) -> AnalyzeResponse {
    // ---
    let summary = non_empty_str(raw.get("summary"))
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    let recommendations = raw
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|recs| {
            recs.iter()
                .take(MAX_RECOMMENDATIONS)
                .map(normalize_recommendation)
                .collect()
        })
        .unwrap_or_default();

    AnalyzeResponse {
        summary,
        score: normalize_score(raw.get("score")),
        recommendations,
        provider,
        analyzed_at,
    }
}

/// Clamp into [0, 100] as an integer; absent or non-numeric means the default.
pub fn normalize_score(score: Option<&Value>) -> u8 {
    // ---
    let numeric = match score {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match numeric {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_SCORE,
    }
}

fn normalize_recommendation(raw: &Value) -> Recommendation {
    // ---
    Recommendation {
        category: Category::from_label(raw.get("category").and_then(Value::as_str)),
        title: non_empty_str(raw.get("title"))
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        description: non_empty_str(raw.get("description"))
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string(),
        priority: Priority::from_label(raw.get("priority").and_then(Value::as_str)),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
