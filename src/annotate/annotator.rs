//! Per-folder scene annotation.

use crate::annotate::client::{ContentBlock, TokenUsage, VisionModel, VisionRequest};
use crate::annotate::extract::extract_record;
use crate::annotate::AnnotationRecord;
use crate::annotate::prompt::{SCENE_PROMPT, frame_label};
use crate::error::Result;
use crate::frames::SampledFrameSet;
use crate::preprocess::{ImagePreprocessor, capture_timestamp};
use tracing::{debug, info, warn};

/// Outcome of annotating one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Parsed scene description.
    pub record: AnnotationRecord,
    /// Tokens billed, `None` when no call was made.
    pub usage: Option<TokenUsage>,
}

enum Mode<'a> {
    DryRun,
    Live {
        model: &'a dyn VisionModel,
        preprocessor: ImagePreprocessor,
    },
}

/// Turns sampled frames into an [`AnnotationRecord`].
pub struct SceneAnnotator<'a> {
    mode: Mode<'a>,
}

impl<'a> SceneAnnotator<'a> {
    /// Annotator that never calls the model.
    pub const fn dry_run() -> Self {
        Self { mode: Mode::DryRun }
    }

    /// Annotator backed by `model`.
    pub const fn live(model: &'a dyn VisionModel, preprocessor: ImagePreprocessor) -> Self {
        Self {
            mode: Mode::Live {
                model,
                preprocessor,
            },
        }
    }

    /// Whether this annotator skips model calls.
    pub const fn is_dry_run(&self) -> bool {
        matches!(self.mode, Mode::DryRun)
    }

    /// Annotate one folder's sampled frames.
    ///
    /// Exactly one model call is made in live mode. Any failure is returned
    /// to the caller unretried.
    pub fn annotate(&self, frames: &SampledFrameSet) -> Result<Annotation> {
        let (model, preprocessor) = match &self.mode {
            Mode::DryRun => {
                info!("[DRY RUN] Skipping model call");
                return Ok(Annotation {
                    record: AnnotationRecord::dry_run_placeholder(),
                    usage: None,
                });
            }
            Mode::Live {
                model,
                preprocessor,
            } => (*model, preprocessor),
        };

        let request = build_request(frames, preprocessor)?;
        let response = model.complete(&request)?;
        debug!("Response content: {}", response.text);

        let record = extract_record(&response.text)?;
        if record.count_mismatch() {
            warn!(
                "Reported count {} differs from {} listed individual(s)",
                record.count,
                record.individuals.len()
            );
        }

        Ok(Annotation {
            record,
            usage: Some(response.usage),
        })
    }
}

/// Assemble the prompt, labels and encoded frames in presentation order.
pub fn build_request(
    frames: &SampledFrameSet,
    preprocessor: &ImagePreprocessor,
) -> Result<VisionRequest> {
    let mut content = Vec::with_capacity(1 + 2 * frames.len());
    content.push(ContentBlock::Text(SCENE_PROMPT.to_string()));

    for (i, path) in frames.paths().iter().enumerate() {
        let label = frame_label(i + 1, capture_timestamp(path).as_deref());
        debug!("{label}");
        let prepared = preprocessor.prepare(path)?;
        content.push(ContentBlock::Text(label));
        content.push(ContentBlock::Image(prepared.bytes));
    }

    Ok(VisionRequest { content })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::annotate::client::VisionResponse;
    use crate::config::PreprocessConfig;
    use crate::error::Error;
    use crate::frames::{Folder, FrameSampler};
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    struct FakeModel {
        reply: String,
        requests: RefCell<Vec<VisionRequest>>,
    }

    impl FakeModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl VisionModel for FakeModel {
        fn complete(&self, request: &VisionRequest) -> Result<VisionResponse> {
            self.requests.borrow_mut().push(request.clone());
            Ok(VisionResponse {
                text: self.reply.clone(),
                usage: TokenUsage {
                    input_tokens: 1000,
                    output_tokens: 150,
                },
            })
        }
    }

    struct RejectingModel;

    impl VisionModel for RejectingModel {
        fn complete(&self, _request: &VisionRequest) -> Result<VisionResponse> {
            Err(Error::Authentication {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            })
        }
    }

    fn folder_with_images(dir: &Path, count: usize) -> Folder {
        let mut images = Vec::new();
        for i in 1..=count {
            let name = format!("f{i:03}.jpg");
            RgbImage::from_pixel(40, 30, Rgb([90, 90, 90]))
                .save(dir.join(&name))
                .unwrap();
            images.push(name);
        }
        Folder {
            path: dir.to_path_buf(),
            month: "202506".to_string(),
            images,
        }
    }

    fn preprocessor() -> ImagePreprocessor {
        ImagePreprocessor::new(PreprocessConfig::default())
    }

    #[test]
    fn test_dry_run_placeholder() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 3);
        let frames = FrameSampler::new(5, None).sample(&folder);

        let annotation = SceneAnnotator::dry_run().annotate(&frames).unwrap();
        assert_eq!(annotation.record.count, 0);
        assert!(annotation.record.individuals.is_empty());
        assert_eq!(annotation.usage, None);
    }

    #[test]
    fn test_request_order() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 2);
        let frames = FrameSampler::new(5, None).sample(&folder);

        let request = build_request(&frames, &preprocessor()).unwrap();
        assert_eq!(request.content.len(), 5);
        assert_eq!(request.content[0], ContentBlock::Text(SCENE_PROMPT.to_string()));
        assert_eq!(request.content[1], ContentBlock::Text("Image 1".to_string()));
        assert!(matches!(request.content[2], ContentBlock::Image(_)));
        assert_eq!(request.content[3], ContentBlock::Text("Image 2".to_string()));
        assert!(matches!(request.content[4], ContentBlock::Image(_)));
    }

    #[test]
    fn test_live_annotation() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 2);
        let frames = FrameSampler::new(5, None).sample(&folder);
        let model = FakeModel::new(
            "Sure.\n```json\n{\"count\": 1, \"individuals\": [{\"id\": \"moose_1\", \
             \"species\": \"Alces alces\"}], \"summary\": \"A bull moose browses.\"}\n```",
        );

        let annotator = SceneAnnotator::live(&model, preprocessor());
        let annotation = annotator.annotate(&frames).unwrap();

        assert_eq!(model.requests.borrow().len(), 1);
        assert_eq!(annotation.record.count, 1);
        assert_eq!(annotation.record.individuals[0].species, "Alces alces");
        assert_eq!(
            annotation.usage,
            Some(TokenUsage {
                input_tokens: 1000,
                output_tokens: 150
            })
        );
    }

    #[test]
    fn test_count_mismatch_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 1);
        let frames = FrameSampler::new(5, None).sample(&folder);
        let model = FakeModel::new("{\"count\": 4, \"individuals\": []}");

        let annotation = SceneAnnotator::live(&model, preprocessor())
            .annotate(&frames)
            .unwrap();
        assert!(annotation.record.count_mismatch());
    }

    #[test]
    fn test_unstructured_reply_fails() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 1);
        let frames = FrameSampler::new(5, None).sample(&folder);
        let model = FakeModel::new("I see a forest.");

        let result = SceneAnnotator::live(&model, preprocessor()).annotate(&frames);
        assert!(matches!(result, Err(Error::NoStructuredPayload { .. })));
    }

    #[test]
    fn test_authentication_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let folder = folder_with_images(dir.path(), 1);
        let frames = FrameSampler::new(5, None).sample(&folder);

        let result = SceneAnnotator::live(&RejectingModel, preprocessor()).annotate(&frames);
        assert!(result.unwrap_err().is_authentication());
    }
}
