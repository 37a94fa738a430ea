//! Instruction prompt shared by both providers.

/// Asks for a summary, a 0–100 score and 3–4 categorized recommendations as JSON.
pub const ANALYSIS_PROMPT: &str = r#"You are a health and fitness AI assistant. Analyze the user's health data and provide:

1. A brief summary (2-3 sentences) of their overall health status based on the data.
2. 3-4 specific, actionable recommendations for improving their health.

For each recommendation, provide:
- category: one of "sleep", "exercise", "nutrition", or "general"
- title: a short title (3-5 words)
- description: a helpful explanation (1-2 sentences)
- priority: "high", "medium", or "low" based on importance

Also calculate a health score from 0-100 based on:
- Step count (goal: 10,000/day)
- Active minutes (goal: 30 min/day)
- Sleep (goal: 7-9 hours)
- Heart rate variability (60-100 BPM is healthy)

Respond in JSON format:
{
  "summary": "string",
  "score": number,
  "recommendations": [
    {
      "category": "exercise|sleep|nutrition|general",
      "title": "string",
      "description": "string",
      "priority": "high|medium|low"
    }
  ]
}"#;

/// User turn for the OpenAI path (the prompt goes in the system turn).
pub fn openai_user_message(health_summary: &str) -> String {
    format!(
        "Please analyze this health data and provide recommendations:\n\n{}",
        health_summary
    )
}

/// Single user turn for the Gemini path.
pub fn gemini_user_message(health_summary: &str) -> String {
    format!("{}\n\nUser's health data:\n{}", ANALYSIS_PROMPT, health_summary)
}
