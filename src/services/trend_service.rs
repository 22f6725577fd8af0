use chrono::NaiveDate;

use crate::models::{fallback_trends, TrendData, TrendSource};
use crate::services::gateway::{ModelGateway, ModelKind};
use crate::utils::AppError;

fn trends_prompt(date: NaiveDate) -> String {
    format!(
        r##"As an Instagram trend analyst, provide current viral trends analysis for {}.

Analyze and return 6 trending categories in this exact JSON format:
[
    {{
        "category": "Content Format",
        "description": "Brief description of the trend",
        "score": 85,
        "hashtags": ["#trend1", "#trend2"],
        "examples": ["Example 1", "Example 2"]
    }}
]

Categories to cover:
1. Content Format (Reels length, editing style)
2. Audio Trends (Trending sounds, music)
3. Visual Style (Colors, filters, aesthetics)
4. Caption Style (Tone, length, hooks)
5. Engagement Tactics (CTAs, questions, polls)
6. Algorithm Insights (Best posting times, content types)

Return ONLY valid JSON array, no additional text."##,
        date.format("%-m/%-d/%Y")
    )
}

/// Span from the first `[` to the last `]`, if any.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

/// Parses the model reply, falling back to the static report when it holds no usable array.
pub fn parse_trends(raw: &str) -> (Vec<TrendData>, TrendSource) {
    let parsed = extract_json_array(raw)
        .ok_or_else(|| "No JSON found in response".to_string())
        .and_then(|json| serde_json::from_str::<Vec<TrendData>>(json).map_err(|e| e.to_string()));

    match parsed {
        Ok(trends) => {
            log::info!("📈 [TrendAnalyzer] Trends analyzed: {}", trends.len());
            (trends, TrendSource::Model)
        }
        Err(e) => {
            log::warn!("⚠️  [TrendAnalyzer] Failed to parse trends, using fallback: {}", e);
            (fallback_trends(), TrendSource::Fallback)
        }
    }
}

pub async fn analyze_trends(
    gateway: &dyn ModelGateway,
    model: &str,
    date: NaiveDate,
) -> Result<(Vec<TrendData>, TrendSource), AppError> {
    log::info!("📊 [TrendAnalyzer] Fetching latest Instagram trends with {}", model);

    let response = gateway
        .query_text(model, &trends_prompt(date), ModelKind::Text, None)
        .await?;

    Ok(parse_trends(&response))
}
