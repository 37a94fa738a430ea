use chrono::Utc;
use serde_json::json;
use tokio_test::assert_ok;

use vitals_insight::{
    client::{AnalysisClient, AnalysisOptions, FALLBACK_SCORE},
    storage::HealthStorage,
    AppError, DailyRecordUpdate, DataScope, Frequency, HeartRate, Provider,
};

mod common;
use common::{spawn_app, StubAnalyzer};

async fn client_with_today(api_url: &str) -> AnalysisClient {
    // ---
    let storage = assert_ok!(HealthStorage::in_memory().await);
    assert_ok!(
        storage
            .update_today(&DailyRecordUpdate {
                steps: Some(9120.0),
                heart_rate: Some(HeartRate {
                    avg: 68.0,
                    min: 54.0,
                    max: 122.0,
                }),
                sleep_hours: Some(7.5),
                active_minutes: Some(35.0),
                calories: Some(2050.0),
                distance: Some(6.4),
            })
            .await
    );
    AnalysisClient::new(api_url, storage)
}

#[tokio::test]
async fn run_analysis_stores_service_result_and_settings() {
    // ---
    let stub = StubAnalyzer::replying(json!({
        "summary": "Active day with good sleep.",
        "score": 140,
        "recommendations": [
            { "category": "exercise", "title": "Keep Moving", "description": "Stay above 9k steps.", "priority": "low" },
            { "category": "sleep", "title": "Same Bedtime", "description": "Stick to 23:00.", "priority": "medium" },
            { "category": "nutrition", "title": "More Protein", "description": "Add eggs to breakfast.", "priority": "high" },
            { "category": "general", "title": "Stretch", "description": "Five minutes daily.", "priority": "low" },
            { "category": "general", "title": "Extra", "description": "Truncated.", "priority": "low" }
        ]
    }));
    let base = spawn_app(&stub).await;
    let client = client_with_today(&base).await;

    let outcome = assert_ok!(
        client
            .run_analysis(AnalysisOptions {
                provider: Provider::Gemini,
                frequency: Frequency::Hourly,
                data_scope: DataScope::Today,
            })
            .await
    );

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.result.provider, Provider::Gemini);
    assert_eq!(outcome.result.score, 100);
    assert_eq!(outcome.result.recommendations.len(), 4);
    assert_eq!(outcome.result.summary, "Active day with good sleep.");
    assert!(!client.is_running());

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.starts_with("Health Data Summary (1 day):"));
    assert!(calls[0].1.contains("9,120 steps"));

    let history = client.storage().analysis_results().await.unwrap();
    assert_eq!(history, vec![outcome.result.clone()]);

    let settings = client.storage().settings().await.unwrap();
    assert_eq!(settings.provider, Provider::Gemini);
    assert_eq!(settings.frequency, Frequency::Hourly);
    assert_eq!(settings.data_scope, DataScope::Today);
    assert!(settings.last_analysis_time.is_some());
}

#[tokio::test]
async fn run_analysis_falls_back_when_service_fails() {
    // ---
    let stub = StubAnalyzer::failing("No response from OpenAI");
    let base = spawn_app(&stub).await;
    let client = client_with_today(&base).await;

    let outcome = assert_ok!(client.run_analysis(AnalysisOptions::default()).await);

    assert!(outcome.used_fallback);
    assert_eq!(outcome.result.score, FALLBACK_SCORE);
    assert_eq!(outcome.result.recommendations.len(), 3);
    assert_eq!(stub.calls().len(), 1);

    let history = client.storage().analysis_results().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.result.id);
    assert!(client.storage().settings().await.unwrap().last_analysis_time.is_some());
}

#[tokio::test]
async fn run_analysis_falls_back_when_service_unreachable() {
    // ---
    // Port 9 (discard) is not served in the test environment.
    let client = client_with_today("http://127.0.0.1:9").await;

    let outcome = assert_ok!(client.run_analysis(AnalysisOptions::default()).await);

    assert!(outcome.used_fallback);
    assert_eq!(client.storage().analysis_results().await.unwrap().len(), 1);
}

#[tokio::test]
async fn request_analysis_surfaces_server_message() {
    // ---
    let stub = StubAnalyzer::failing("No response from OpenAI");
    let base = spawn_app(&stub).await;
    let client = client_with_today(&base).await;

    let err = client
        .request_analysis(Provider::OpenAi, DataScope::Today, &[])
        .await
        .unwrap_err();

    match err {
        AppError::Upstream(message) => assert_eq!(message, "No response from OpenAI"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn run_analysis_with_no_records_in_scope_sends_placeholder() {
    // ---
    let stub = StubAnalyzer::replying(json!({ "summary": "No data yet.", "score": 60 }));
    let base = spawn_app(&stub).await;
    let storage = HealthStorage::in_memory().await.unwrap();
    let client = AnalysisClient::new(base, storage);

    let outcome = assert_ok!(
        client
            .run_analysis(AnalysisOptions {
                data_scope: DataScope::Month,
                ..Default::default()
            })
            .await
    );

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.result.score, 60);
    assert_eq!(stub.calls()[0].1, "No health data available.");
}

#[tokio::test]
async fn repeated_runs_keep_thirty_most_recent() {
    // ---
    let stub = StubAnalyzer::replying(json!({ "summary": "ok", "score": 70 }));
    let base = spawn_app(&stub).await;
    let client = client_with_today(&base).await;

    let mut ids = Vec::new();
    for _ in 0..32 {
        let outcome = client.run_analysis(AnalysisOptions::default()).await.unwrap();
        ids.push(outcome.result.id);
    }

    let history = client.storage().analysis_results().await.unwrap();
    assert_eq!(history.len(), 30);
    assert_eq!(history[0].id, ids[31]);
    assert_eq!(history[29].id, ids[2]);
    assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert!(history[0].timestamp <= Utc::now());
}
