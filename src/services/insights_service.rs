use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::catalog::{SENTIMENT_MODEL, SUMMARY_MODEL, TOPIC_MODEL};
use crate::services::gateway::{output_text, ModelGateway, ModelKind};
use crate::utils::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InsightsRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct SentimentResult {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InsightsResponse {
    pub success: bool,
    pub sentiment: Option<SentimentResult>,
    pub summary: String,
    pub topics: Vec<String>,
}

fn as_sentiment(value: &Value) -> Option<SentimentResult> {
    Some(SentimentResult {
        label: value.get("label")?.as_str()?.to_string(),
        score: value.get("score")?.as_f64()?,
    })
}

/// Classifier replies come as one `{label, score}`, a list of them, or a list nested once
/// more (one list per input). The highest score wins.
pub fn pick_sentiment(value: &Value) -> Option<SentimentResult> {
    match value {
        Value::Object(_) => as_sentiment(value),
        Value::Array(items) => items
            .iter()
            .filter_map(pick_sentiment)
            .max_by(|a, b| a.score.total_cmp(&b.score)),
        _ => None,
    }
}

/// Topic labels from a zero-shot reply (`{labels: [...]}`), a plain list of strings, or a
/// list of `{label}` objects.
pub fn pick_topics(value: &Value) -> Vec<String> {
    if let Some(labels) = value.get("labels") {
        return pick_topics(labels);
    }

    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => other.get("label").and_then(Value::as_str).map(str::to_string),
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

pub async fn analyze_sentiment(gateway: &dyn ModelGateway, text: &str) -> Result<Option<SentimentResult>, AppError> {
    let response = gateway
        .query_model(SENTIMENT_MODEL, text, ModelKind::Text, None)
        .await?;
    Ok(pick_sentiment(&response))
}

pub async fn generate_summary(gateway: &dyn ModelGateway, text: &str) -> Result<String, AppError> {
    let response = gateway
        .query_model(SUMMARY_MODEL, text, ModelKind::Text, None)
        .await?;
    Ok(output_text(&response))
}

pub async fn classify_topics(gateway: &dyn ModelGateway, text: &str) -> Result<Vec<String>, AppError> {
    let response = gateway
        .query_model(TOPIC_MODEL, text, ModelKind::Text, None)
        .await?;
    Ok(pick_topics(&response))
}

pub async fn text_insights(gateway: &dyn ModelGateway, text: &str) -> Result<InsightsResponse, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidRequest("Text is required".to_string()));
    }

    log::info!("🔎 [Insights] Analyzing {} chars", text.len());

    let sentiment = analyze_sentiment(gateway, text).await?;
    let summary = generate_summary(gateway, text).await?;
    let topics = classify_topics(gateway, text).await?;

    Ok(InsightsResponse {
        success: true,
        sentiment,
        summary,
        topics,
    })
}
