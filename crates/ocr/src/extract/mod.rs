// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod address;
pub mod id_number;
pub mod identity;

pub use address::AddressExtractor;
pub use id_number::extract_id_number;
pub use identity::extract_identity;

/// A single heuristic for one field. Gets the cleaned lines, returns a value if it is confident.
pub type Strategy = fn(&[&str]) -> Option<String>;

/// Trimmed, non-empty lines of normalized OCR text.
pub fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Evaluate strategies in order and stop at the first hit.
pub fn first_match(strategies: &[(&'static str, Strategy)], lines: &[&str]) -> Option<String> {
    strategies.iter().find_map(|(label, strategy)| {
        let value = strategy(lines)?;
        tracing::debug!(strategy = *label, %value, "strategy matched");
        Some(value)
    })
}

/// Count of ASCII digits in `s`.
pub(crate) fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// True when `s` contains nothing but digits and whitespace.
pub(crate) fn is_numeric_line(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
}
