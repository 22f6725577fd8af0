use lazy_static::lazy_static;
use regex::Regex;

use crate::models::catalog::{
    DEFAULT_AUDIO_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
};
use crate::models::{PipelineInput, PipelineOutput};
use crate::services::gateway::{ModelGateway, ModelKind};
use crate::utils::AppError;

const MAX_VARIATIONS: usize = 3;

const IMAGE_PROMPT: &str = "Describe this image in detail: visual elements, colors, mood, composition, text, objects, and anything relevant for social media.";
const AUDIO_PROMPT: &str = "Describe this audio: sounds, music, voices, ambient noise, mood, and emotion.";
const VIDEO_PROMPT: &str = "Describe this video: what's happening, who/what is in it, setting, mood, and key moments.";

lazy_static! {
    static ref NUMBERED_LINE: Regex = Regex::new(r"^\d+[.)]\s").unwrap();
    static ref LEADING_MARK: Regex = Regex::new(r#"^["'`\-–—]\s*"#).unwrap();
    static ref TRAILING_QUOTE: Regex = Regex::new(r#"\s*["'`]$"#).unwrap();
}

fn caption_prompt(context: &str) -> String {
    format!(
        "You are an expert Instagram caption writer. Create 3 viral-worthy, copy-paste ready Instagram captions.

CONTEXT:
{context}

REQUIREMENTS:
- Start with a powerful hook that grabs attention
- Include a call-to-action or engaging question
- Add 5-8 trending, relevant hashtags at the end
- Keep each caption 100-150 characters
- Make it sound authentic and relatable
- Each caption should feel complete and ready to post

Return ONLY the 3 captions, one per line. No numbering, no labels, just the captions."
    )
}

fn reasoning_prompt(context: &str) -> String {
    format!(
        "Analyze this Instagram content for viral potential:

{context}

Provide concise strategic reasoning with:
1. **Trend Analysis**: Current trends relevant to this content
2. **Engagement Factors**: Key elements (hooks, CTAs) that drive engagement
3. **Platform Optimization**: Instagram-specific tips (Stories, Reels, hashtags)
4. **Reach Recommendations**: Actionable tips for maximum visibility

Keep it brief and actionable."
    )
}

/// Turns the raw caption reply into at most three clean, postable lines.
///
/// Numbered lines (`1. ...`, `2) ...`) are treated as list scaffolding and dropped, a single
/// leading quote or dash and a single trailing quote are stripped from the rest.
pub fn split_captions(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty() && !NUMBERED_LINE.is_match(line))
        .map(|line| {
            let line = LEADING_MARK.replace(line, "");
            TRAILING_QUOTE.replace(&line, "").trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .take(MAX_VARIATIONS)
        .collect()
}

struct MediaStep<'a> {
    url: Option<&'a str>,
    kind: ModelKind,
    model: &'static str,
    prompt: &'static str,
    label: &'static str,
}

/// Runs the caption pipeline: describe each supplied medium, fold the descriptions into one
/// context, embed it, then ask the selected text model for captions and for reasoning.
pub async fn run_trend_pipeline(gateway: &dyn ModelGateway, input: &PipelineInput) -> Result<PipelineOutput, AppError> {
    log::info!(
        "🚀 [Pipeline] Starting: caption={} image={} audio={} video={} model={:?} type={:?}",
        input.caption().is_some(),
        input.image().is_some(),
        input.audio().is_some(),
        input.video().is_some(),
        input.model,
        input.model_type
    );

    if input.caption().is_none() && !input.has_media() {
        return Err(AppError::InvalidRequest(
            "Provide caption text or at least one media URL".to_string(),
        ));
    }

    let selected_model = input
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_TEXT_MODEL);

    let mut context = input.caption_text.clone().unwrap_or_default();
    let mut analyses = [String::new(), String::new(), String::new()];

    let steps = [
        MediaStep {
            url: input.image(),
            kind: ModelKind::Image,
            model: DEFAULT_IMAGE_MODEL,
            prompt: IMAGE_PROMPT,
            label: "Image",
        },
        MediaStep {
            url: input.audio(),
            kind: ModelKind::Audio,
            model: DEFAULT_AUDIO_MODEL,
            prompt: AUDIO_PROMPT,
            label: "Audio",
        },
        MediaStep {
            url: input.video(),
            kind: ModelKind::Video,
            model: DEFAULT_VIDEO_MODEL,
            prompt: VIDEO_PROMPT,
            label: "Video",
        },
    ];

    for (step, analysis) in steps.iter().zip(analyses.iter_mut()) {
        let Some(url) = step.url else { continue };

        log::info!("🔍 [Pipeline] Analyzing {}...", step.kind.as_str());
        *analysis = gateway
            .query_text(step.model, step.prompt, step.kind, Some(url))
            .await?;
        context.push_str(&format!("\n\n{} Context: {}", step.label, analysis));
        log::info!("✅ [Pipeline] {} analyzed", step.label);
    }

    let embedding = if context.is_empty() {
        None
    } else {
        let embedding = gateway
            .query_model(DEFAULT_EMBEDDING_MODEL, &context, ModelKind::Text, None)
            .await?;
        log::info!("✅ [Pipeline] Embeddings generated");
        Some(embedding)
    };

    log::info!("✍️  [Pipeline] Generating captions with {}", selected_model);
    let variations_text = gateway
        .query_text(selected_model, &caption_prompt(&context), ModelKind::Text, None)
        .await?;
    let variations = split_captions(&variations_text);
    log::info!("✅ [Pipeline] Captions generated: {}", variations.len());

    log::info!("🧠 [Pipeline] Generating reasoning with {}", selected_model);
    let generated_reasoning = gateway
        .query_text(selected_model, &reasoning_prompt(&context), ModelKind::Text, None)
        .await?;

    log::info!("🎉 [Pipeline] Complete");

    let [image_analysis, audio_analysis, video_analysis] = analyses;

    Ok(PipelineOutput {
        variations,
        generated_reasoning,
        embedding,
        image_analysis,
        audio_analysis,
        video_analysis,
    })
}
