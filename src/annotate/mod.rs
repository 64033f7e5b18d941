//! Scene annotation through a multimodal model.
//!
//! Sampled frames are labelled, attached behind a fixed instruction and sent
//! in a single request per folder. The JSON object in the reply is decoded
//! into an [`AnnotationRecord`].

mod annotator;
mod client;
mod extract;
mod prompt;
mod types;

pub use annotator::{Annotation, SceneAnnotator, build_request};
pub use client::{
    ContentBlock, OpenAiClient, TokenUsage, VisionModel, VisionRequest, VisionResponse,
};
pub use extract::{extract_json, extract_record, find_payload};
pub use prompt::{SCENE_PROMPT, frame_label};
pub use types::{AnnotationRecord, Individual};
