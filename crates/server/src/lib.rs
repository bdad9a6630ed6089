pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod telemetry;

use idscan_ocr::{AddressExtractor, CapturePipeline, CorrectionError, CorrectionTable, Normalizer, OcrBackend};
use std::sync::Arc;

use crate::config::Config;
use crate::store::SessionStore;

pub type Pipeline = CapturePipeline<Box<dyn OcrBackend>>;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(pipeline),
            sessions: SessionStore::new(config.session.ttl()?, config.session.merge_policy),
        })
    }
}

#[cfg(feature = "tesseract")]
pub fn build_backend(config: &Config) -> Box<dyn OcrBackend> {
    use idscan_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Box::new(TesseractRecognizer::new(config.ocr.tessdata.clone(), &config.ocr.lang))
}

#[cfg(not(feature = "tesseract"))]
pub fn build_backend(_config: &Config) -> Box<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; every capture will read as empty text");
    Box::new(idscan_ocr::MockRecognizer::new(""))
}

/// Pipeline with the configured engine and correction tables.
pub fn build_pipeline(config: &Config, backend: Box<dyn OcrBackend>) -> Result<Pipeline, CorrectionError> {
    let mut pipeline = CapturePipeline::new(backend).with_preprocess(config.ocr.preprocess.clone());
    if let Some(path) = &config.corrections.normalizer {
        pipeline = pipeline.with_normalizer(Normalizer::new(CorrectionTable::from_file(path)?)?);
    }
    if let Some(path) = &config.corrections.address {
        pipeline = pipeline.with_address_extractor(AddressExtractor::new(CorrectionTable::from_file(path)?));
    }
    Ok(pipeline)
}
