pub mod corrections;
pub mod extract;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use corrections::{CorrectionError, CorrectionKind, CorrectionRule, CorrectionTable};
pub use extract::{extract_id_number, extract_identity, AddressExtractor};
pub use normalize::Normalizer;
pub use payload::{decode_payload, PayloadError};
pub use pipeline::{CaptureOutcome, CapturePipeline, PipelineError};
pub use preprocess::{prepare_for_ocr, prepare_for_ocr_from_bytes, PreprocessError, PreprocessOptions};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
