use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/ai/generate`. Media arrive as URLs already uploaded by the client.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub caption_text: Option<String>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub model: Option<String>,
    pub model_type: Option<String>,
}

impl PipelineInput {
    pub fn image(&self) -> Option<&str> {
        non_blank(&self.image_url)
    }

    pub fn audio(&self) -> Option<&str> {
        non_blank(&self.audio_url)
    }

    pub fn video(&self) -> Option<&str> {
        non_blank(&self.video_url)
    }

    pub fn caption(&self) -> Option<&str> {
        non_blank(&self.caption_text)
    }

    pub fn has_media(&self) -> bool {
        self.image().is_some() || self.audio().is_some() || self.video().is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub variations: Vec<String>,
    pub generated_reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub embedding: Option<serde_json::Value>,
    pub image_analysis: String,
    pub audio_analysis: String,
    pub video_analysis: String,
}
