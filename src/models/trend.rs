use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TrendData {
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Models sometimes quote the score ("85", "85%"); anything else non-numeric is rejected.
fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("score out of range")),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("score is not a number: {}", s))),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!("expected a numeric score, got {}", other))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Model,
    Fallback,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResponse {
    pub success: bool,
    pub trends: Vec<TrendData>,
    pub source: TrendSource,
    pub last_updated: String,
}

fn trend(category: &str, description: &str, score: f64, hashtags: &[&str], examples: &[&str]) -> TrendData {
    TrendData {
        category: category.to_string(),
        description: description.to_string(),
        score,
        hashtags: hashtags.iter().map(|s| s.to_string()).collect(),
        examples: examples.iter().map(|s| s.to_string()).collect(),
    }
}

/// Static report served when the model reply cannot be parsed.
pub fn fallback_trends() -> Vec<TrendData> {
    vec![
        trend(
            "Content Format",
            "Short-form Reels under 15s are dominating. Quick cuts and fast pacing drive retention.",
            92.0,
            &["#reels", "#shortform", "#viral"],
            &["7-second hooks", "Quick transitions", "Loop-friendly content"],
        ),
        trend(
            "Audio Trends",
            "Sped-up versions of popular songs and nostalgic sounds are trending.",
            88.0,
            &["#spedup", "#trending", "#audio"],
            &["90s remixes", "Sped-up pop hits", "Movie dialogues"],
        ),
        trend(
            "Visual Style",
            "High contrast B&W edits and vintage film aesthetics are gaining traction.",
            85.0,
            &["#aesthetic", "#vintage", "#film"],
            &["Film grain overlays", "Moody lighting", "Retro filters"],
        ),
        trend(
            "Caption Style",
            "Conversational, story-driven captions with authentic voice are performing best.",
            90.0,
            &["#storytelling", "#authentic", "#real"],
            &["Personal anecdotes", "Relatable humor", "Raw vulnerability"],
        ),
        trend(
            "Engagement Tactics",
            "Question-based CTAs and 'comment your answer' prompts drive high engagement.",
            87.0,
            &["#engagement", "#comment", "#interactive"],
            &["This or that?", "Tag someone who...", "Drop a 🔥 if..."],
        ),
        trend(
            "Algorithm Insights",
            "Posting during 6-9 AM and 7-10 PM yields highest reach. Carousels get 3x more saves.",
            91.0,
            &["#algorithm", "#instagramtips", "#growth"],
            &["Peak posting times", "Carousel posts", "Save-worthy content"],
        ),
    ]
}
