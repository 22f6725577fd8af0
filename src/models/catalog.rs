use serde::Serialize;

pub const DEFAULT_TEXT_MODEL: &str = "Qwen/Qwen3-4B";
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemma-3-4b-it";
pub const DEFAULT_VIDEO_MODEL: &str = "llava-hf/LLaVA-NeXT-Video-7B-hf";
pub const DEFAULT_AUDIO_MODEL: &str = "Qwen/Qwen2-Audio-7B-Instruct";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub const SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const SUMMARY_MODEL: &str = "bartowski/Llama-3.2-3B-Instruct-GGUF";
pub const TOPIC_MODEL: &str = "facebook/bart-large-mnli";

const TEXT_MODELS: &[&str] = &[
    DEFAULT_TEXT_MODEL,
    "microsoft/Phi-3-mini-4k-instruct",
    "meta-llama/Llama-3.2-11B-Vision-Instruct",
];

#[derive(Debug, Serialize)]
pub struct ModelsByKind<T> {
    pub text: T,
    pub image: T,
    pub video: T,
    pub audio: T,
}

#[derive(Debug, Serialize)]
pub struct ModelCatalogResponse {
    pub success: bool,
    pub featured_models: ModelsByKind<Vec<&'static str>>,
    pub defaults: ModelsByKind<&'static str>,
}

pub fn model_catalog() -> ModelCatalogResponse {
    ModelCatalogResponse {
        success: true,
        featured_models: ModelsByKind {
            text: TEXT_MODELS.to_vec(),
            image: vec![DEFAULT_IMAGE_MODEL],
            video: vec![DEFAULT_VIDEO_MODEL],
            audio: vec![DEFAULT_AUDIO_MODEL],
        },
        defaults: ModelsByKind {
            text: DEFAULT_TEXT_MODEL,
            image: DEFAULT_IMAGE_MODEL,
            video: DEFAULT_VIDEO_MODEL,
            audio: DEFAULT_AUDIO_MODEL,
        },
    }
}
