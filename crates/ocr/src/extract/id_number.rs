use idscan_core::{Field, FieldUpdate};
use regex::Regex;

use super::digit_count;

re!(re_id_spaced, r"\d{4} \d{4} \d{4}");
re!(re_id_hyphenated, r"\d{4}-\d{4}-\d{4}");
re!(re_id_contiguous, r"\d{12}");
re!(re_id_loose, r"\d(?:[ \-]?\d){11}");

pub const ID_DIGITS: usize = 12;

/// Most specific first.
fn candidate_patterns() -> [(&'static str, &'static Regex); 4] {
    [
        ("spaced", re_id_spaced()),
        ("hyphenated", re_id_hyphenated()),
        ("contiguous", re_id_contiguous()),
        ("loose", re_id_loose()),
    ]
}

/// Aadhaar number over the whole text, redacted to its last four digits.
pub fn extract_id_number(text: &str) -> FieldUpdate {
    FieldUpdate::new().with(Field::Aadhaar, find_id_digits(text).map(|d| redact(&d)).unwrap_or_default())
}

/// The 12 digits of the first candidate that really has 12 digits and stands on its own.
pub fn find_id_digits(text: &str) -> Option<String> {
    candidate_patterns().into_iter().find_map(|(label, re)| {
        let digits = isolated_matches(re, text)
            .map(|m| m.chars().filter(char::is_ascii_digit).collect::<String>())
            .find(|d| d.len() == ID_DIGITS)?;
        tracing::debug!(pattern = label, "id number candidate accepted");
        Some(digits)
    })
}

/// Matches of `re`, overlapping ones included, that do not continue a longer digit run.
fn isolated_matches<'t>(re: &'static Regex, text: &'t str) -> impl Iterator<Item = &'t str> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(m) = re.find_at(text, pos) {
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            if !continues_digits(text[..m.start()].chars().rev()) && !continues_digits(text[m.end()..].chars()) {
                return Some(m.as_str());
            }
        }
        pos = text.len();
        None
    })
}

/// A digit next to the candidate, or one behind a single space or hyphen (the 4-4-4-4 VID layout).
fn continues_digits(mut neighbours: impl Iterator<Item = char>) -> bool {
    match neighbours.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(' ' | '-') => neighbours.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// `XXXX-XXXX-` + last four. Anything but exactly 12 digits redacts to `""`.
pub fn redact(digits: &str) -> String {
    if digit_count(digits) != ID_DIGITS || digits.len() != ID_DIGITS {
        return String::new();
    }
    format!("XXXX-XXXX-{}", &digits[ID_DIGITS - 4..])
}
