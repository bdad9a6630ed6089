use crate::corrections::{CorrectionError, CorrectionKind, CorrectionTable};

/// Whole-text literal clean-up applied to raw OCR output before any extractor runs.
pub struct Normalizer {
    table: CorrectionTable,
}

impl Normalizer {
    /// Literal rules only; a regex rule here is a configuration mistake.
    pub fn new(table: CorrectionTable) -> Result<Self, CorrectionError> {
        if let Some(rule) = table.rules().find(|r| r.kind == CorrectionKind::Regex) {
            return Err(CorrectionError::RegexInLiteralTable(rule.pattern.clone()));
        }
        Ok(Self { table })
    }

    pub fn normalize(&self, raw_text: &str) -> String {
        self.table.apply(raw_text).trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { table: CorrectionTable::default_normalizer() }
    }
}
