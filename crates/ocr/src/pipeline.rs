use idscan_core::{FieldGroup, FieldUpdate, Stage};
use std::path::Path;
use thiserror::Error;

use crate::extract::{extract_id_number, extract_identity, AddressExtractor};
use crate::normalize::Normalizer;
use crate::preprocess::{self, PreprocessOptions};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of running one capture through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    /// Normalized OCR text; empty when the image could not be read.
    pub ocr_text: String,
    /// Fields owned by the stage, each present (possibly `""`).
    pub update: FieldUpdate,
}

/// Orchestrates: preprocess → OCR → normalize → the stage's extractors.
pub struct CapturePipeline<R: OcrBackend> {
    recognizer: R,
    normalizer: Normalizer,
    address: AddressExtractor,
    preprocess: PreprocessOptions,
}

impl<R: OcrBackend> CapturePipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            normalizer: Normalizer::default(),
            address: AddressExtractor::default(),
            preprocess: PreprocessOptions::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_address_extractor(mut self, address: AddressExtractor) -> Self {
        self.address = address;
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessOptions) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Preprocess + OCR, surfacing failures.
    pub fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, PipelineError> {
        let prepared = preprocess::prepare_for_ocr_from_bytes(image_bytes, &self.preprocess)?;
        Ok(self.recognizer.recognize(&prepared)?)
    }

    /// Run a capture end to end. Image or OCR failures degrade to empty text,
    /// so the stage's fields still come back (empty).
    pub fn process(&self, image_bytes: &[u8], stage: Stage) -> CaptureOutcome {
        let raw = self.recognize_text(image_bytes).unwrap_or_else(|e| {
            tracing::warn!(%stage, error = %e, "capture unreadable, continuing with empty text");
            String::new()
        });
        self.process_text(&raw, stage)
    }

    /// The text half of the pipeline: normalize, then run the stage's extractors.
    pub fn process_text(&self, raw_text: &str, stage: Stage) -> CaptureOutcome {
        let ocr_text = self.normalizer.normalize(raw_text);
        let mut update = FieldUpdate::new();
        for group in stage.groups() {
            update.extend(match group {
                FieldGroup::Identity => extract_identity(&ocr_text),
                FieldGroup::IdNumber => extract_id_number(&ocr_text),
                FieldGroup::Address => self.address.extract(&ocr_text),
            });
        }
        tracing::debug!(%stage, lines = ocr_text.lines().count(), "capture extracted");
        CaptureOutcome { ocr_text, update }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path, stage: Stage) -> Result<CaptureOutcome, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(self.process(&bytes, stage))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
