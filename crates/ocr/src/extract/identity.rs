use idscan_core::{Field, FieldUpdate};

use super::{first_match, lines, Strategy};

re!(re_dob_labeled,
    r"(?i)\b(?:DOB|Date\s+of\s+Birth)\s*[:\-]?\s*(\d{2})[/\-.](\d{2})[/\-.](\d{4})(?:\D|$)");
re!(re_date_bare,
    r"(?:^|\D)(\d{2})[/\-.](\d{2})[/\-.](\d{4})(?:\D|$)");
re!(re_dob_keyword,
    r"(?i)\b(?:DOB|Date\s+of\s+Birth|Year\s+of\s+Birth|YOB)\b");
re!(re_name_shape,
    r"^[A-Z][A-Za-z.']*(?:\s+[A-Z][A-Za-z.']*){1,2}$");
re!(re_gender_other, r"(?i)\bother\b");
re!(re_phone,
    r"(?:^|\D)((?:\+91[\s\-]?|91[\s\-]?|0)?[6-9]\d{4}\s?\d{5})(?:\D|$)");

/// Issuer boilerplate that is never a holder's name.
const RESERVED_HEADER_TOKENS: &[&str] = &[
    "GOVERNMENT",
    "INDIA",
    "AADHAAR",
    "AADHAR",
    "UNIQUE",
    "IDENTIFICATION",
    "AUTHORITY",
    "ENROLMENT",
];

pub const DOB_STRATEGIES: &[(&str, Strategy)] = &[("dob_per_line", dob_per_line)];

pub const NAME_STRATEGIES: &[(&str, Strategy)] = &[
    ("name_before_dob_label", name_before_dob_label),
    ("name_title_case_line", name_title_case_line),
];

pub const GENDER_STRATEGIES: &[(&str, Strategy)] = &[("gender_keyword", gender_keyword)];

pub const PHONE_STRATEGIES: &[(&str, Strategy)] = &[("phone_mobile_number", phone_mobile_number)];

/// Name, DOB, Gender and Phone from the front side. Unresolved fields come back as `""`.
pub fn extract_identity(text: &str) -> FieldUpdate {
    let lines = lines(text);
    let resolve = |strategies: &[(&'static str, Strategy)]| {
        first_match(strategies, &lines).unwrap_or_default()
    };

    FieldUpdate::new()
        .with(Field::Name, resolve(NAME_STRATEGIES))
        .with(Field::Dob, resolve(DOB_STRATEGIES))
        .with(Field::Gender, resolve(GENDER_STRATEGIES))
        .with(Field::Phone, resolve(PHONE_STRATEGIES))
}

// ── DOB ──────────────────────────────────────────────────────────────────────

/// On each line try the labeled form first, then a bare date; stop at the first line with either.
pub fn dob_per_line(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let c = re_dob_labeled()
            .captures(line)
            .or_else(|| re_date_bare().captures(line))?;
        Some(format!("{}/{}/{}", c.get(1)?.as_str(), c.get(2)?.as_str(), c.get(3)?.as_str()))
    })
}

// ── Name ─────────────────────────────────────────────────────────────────────

/// The holder's name is printed directly above the DOB line.
pub fn name_before_dob_label(lines: &[&str]) -> Option<String> {
    let idx = lines.iter().position(|l| re_dob_keyword().is_match(l))?;
    let prev = *lines.get(idx.checked_sub(1)?)?;
    if prev.chars().any(|c| c.is_ascii_digit()) || is_header_line(prev) {
        return None;
    }
    Some(prev.to_string())
}

/// First line shaped like "Firstname Lastname" (2–3 capitalised words) that is not boilerplate.
pub fn name_title_case_line(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .find(|l| re_name_shape().is_match(l) && !is_header_line(l))
        .map(|l| l.to_string())
}

fn is_header_line(line: &str) -> bool {
    line.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_uppercase())
        .any(|w| RESERVED_HEADER_TOKENS.contains(&w.as_str()))
}

// ── Gender ───────────────────────────────────────────────────────────────────

/// "male" is a substring of "female", so female is checked first on every line.
/// "Other" must be a whole word ("Mother" on a relation line is not a gender).
pub fn gender_keyword(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let lower = line.to_lowercase();
        if lower.contains("female") {
            Some("Female".to_string())
        } else if lower.contains("male") {
            Some("Male".to_string())
        } else if re_gender_other().is_match(line) {
            Some("Other".to_string())
        } else {
            None
        }
    })
}

// ── Phone ────────────────────────────────────────────────────────────────────

pub fn phone_mobile_number(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let c = re_phone().captures(line)?;
        Some(c.get(1)?.as_str().chars().filter(|c| !c.is_whitespace()).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(update: &FieldUpdate, field: Field) -> &str {
        update.get(field).unwrap()
    }

    #[test]
    fn front_side_end_to_end() {
        let text = "GOVERNMENT OF INDIA\nAjsal Ashraf\nDOB: 01/02/1990\nMALE\n9876543210";
        let r = extract_identity(text);
        assert_eq!(get(&r, Field::Name), "Ajsal Ashraf");
        assert_eq!(get(&r, Field::Dob), "01/02/1990");
        assert_eq!(get(&r, Field::Gender), "Male");
        assert_eq!(get(&r, Field::Phone), "9876543210");
    }

    #[test]
    fn empty_text_gives_all_empty_fields() {
        let r = extract_identity("");
        for f in [Field::Name, Field::Dob, Field::Gender, Field::Phone] {
            assert_eq!(get(&r, f), "");
        }
        assert_eq!(r.get(Field::Aadhaar), None);
    }

    // ── DOB ──────────────────────────────────────────────────────────────────

    #[test]
    fn dob_separator_normalized_to_slash() {
        assert_eq!(dob_per_line(&["DOB: 01-02-1990"]), Some("01/02/1990".into()));
        assert_eq!(dob_per_line(&["15.08.1947"]), Some("15/08/1947".into()));
    }

    #[test]
    fn dob_date_of_birth_label() {
        assert_eq!(dob_per_line(&["Date of Birth: 21/11/2001"]), Some("21/11/2001".into()));
    }

    #[test]
    fn dob_labeled_beats_bare_on_same_line() {
        assert_eq!(
            dob_per_line(&["Issued 05/06/2020 DOB: 01/02/1990"]),
            Some("01/02/1990".into())
        );
    }

    #[test]
    fn dob_first_matching_line_wins() {
        assert_eq!(
            dob_per_line(&["Issue Date 05/06/2020", "DOB: 01/02/1990"]),
            Some("05/06/2020".into())
        );
    }

    #[test]
    fn dob_ignores_dates_inside_longer_numbers() {
        assert_eq!(dob_per_line(&["9901/02/19905"]), None);
    }

    // ── Name ─────────────────────────────────────────────────────────────────

    #[test]
    fn name_above_dob_label() {
        let l = ["Government of India", "ajsal ashraf", "DOB: 01/02/1990"];
        // Not title-cased, but sits right above the DOB line.
        assert_eq!(name_before_dob_label(&l), Some("ajsal ashraf".into()));
    }

    #[test]
    fn name_above_dob_rejected_when_it_has_digits() {
        let l = ["Ajsal Ashraf", "Ref 1234", "DOB: 01/02/1990"];
        assert_eq!(name_before_dob_label(&l), None);
        assert_eq!(first_match(NAME_STRATEGIES, &l), Some("Ajsal Ashraf".into()));
    }

    #[test]
    fn name_never_taken_from_header() {
        let l = ["GOVERNMENT OF INDIA", "DOB: 01/02/1990"];
        assert_eq!(first_match(NAME_STRATEGIES, &l), None);
        assert_eq!(name_title_case_line(&["Government Of India", "Meera Nair"]), Some("Meera Nair".into()));
    }

    #[test]
    fn name_shape_limits_word_count() {
        assert_eq!(name_title_case_line(&["Mohammed Ajsal Ashraf Khan"]), None);
        assert_eq!(name_title_case_line(&["Ajsal"]), None);
        assert_eq!(name_title_case_line(&["Mohammed Ajsal Ashraf"]), Some("Mohammed Ajsal Ashraf".into()));
    }

    // ── Gender ───────────────────────────────────────────────────────────────

    #[test]
    fn gender_female_has_precedence() {
        assert_eq!(gender_keyword(&["FEMALE MALE"]), Some("Female".into()));
        assert_eq!(gender_keyword(&["Sex: female"]), Some("Female".into()));
    }

    #[test]
    fn gender_other_after_female_and_male() {
        assert_eq!(gender_keyword(&["Gender: OTHER"]), Some("Other".into()));
        assert_eq!(gender_keyword(&["Other / Male"]), Some("Male".into()));
        assert_eq!(gender_keyword(&["Mother: Fathima", "other"]), Some("Other".into()));
        assert_eq!(gender_keyword(&["Brother of Ajsal"]), None);
    }

    #[test]
    fn gender_first_line_wins() {
        assert_eq!(gender_keyword(&["Male", "Female"]), Some("Male".into()));
        assert_eq!(gender_keyword(&["Ajsal Ashraf"]), None);
    }

    // ── Phone ────────────────────────────────────────────────────────────────

    #[test]
    fn phone_with_country_code_and_spaces() {
        assert_eq!(phone_mobile_number(&["Mobile: +91 98765 43210"]), Some("+919876543210".into()));
        assert_eq!(phone_mobile_number(&["+91-9876543210"]), Some("+91-9876543210".into()));
        assert_eq!(phone_mobile_number(&["09876543210"]), Some("09876543210".into()));
    }

    #[test]
    fn phone_must_start_with_six_to_nine() {
        assert_eq!(phone_mobile_number(&["5876543210"]), None);
    }

    #[test]
    fn phone_not_found_in_id_number_or_dates() {
        assert_eq!(
            phone_mobile_number(&["1234 5678 9012", "DOB: 01/02/1990", "98765432101234"]),
            None
        );
    }
}
