use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Image payload is empty")]
    Empty,
    #[error("Data URL is not base64-encoded")]
    NotBase64,
    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode a captured image sent either as bare base64 or as a
/// `data:image/jpeg;base64,...` URL (what a browser canvas produces).
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or(PayloadError::NotBase64)?;
            if !meta.ends_with(";base64") {
                return Err(PayloadError::NotBase64);
            }
            data
        }
        None => payload,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(STANDARD.decode(compact)?)
}
