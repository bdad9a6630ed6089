use idscan_core::{Field, FieldUpdate};

use super::is_numeric_line;
use crate::corrections::CorrectionTable;

re!(re_noise_line, r"^(?:\S{1,2}\s+)*\S{1,2}$");
re!(re_digit_run, r"\d+");
re!(re_separator_run, r"\s*[,\-](?:\s*[,\-])+\s*");
re!(re_space_before_comma, r"\s+,");
re!(re_space_run, r"\s{2,}");

const PINCODE_DIGITS: usize = 6;

/// Address and pincode from the back side.
pub struct AddressExtractor {
    table: CorrectionTable,
}

impl AddressExtractor {
    pub fn new(table: CorrectionTable) -> Self {
        Self { table }
    }

    pub fn extract(&self, text: &str) -> FieldUpdate {
        let address = self.assemble(text);
        let (address, pincode) = split_pincode(&address);
        FieldUpdate::new()
            .with(Field::Address, address)
            .with(Field::Pincode, pincode)
    }

    /// Corrected lines that survive the noise filter, in input order.
    pub fn clean_lines(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| self.table.apply(l))
            .filter(|l| is_kept_line(l))
            .collect()
    }

    fn assemble(&self, text: &str) -> String {
        self.clean_lines(text).join(", ")
    }
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new(CorrectionTable::default_address())
    }
}

/// Longer than 3 characters, not just a number, not a run of 1–2 character OCR crumbs.
pub fn is_kept_line(line: &str) -> bool {
    line.chars().count() > 3 && !is_numeric_line(line) && !re_noise_line().is_match(line)
}

/// Pull the pincode (the last 6-digit run not touching other digits) out of the address.
pub fn split_pincode(address: &str) -> (String, String) {
    let Some(m) = re_digit_run()
        .find_iter(address)
        .filter(|m| m.len() == PINCODE_DIGITS)
        .last()
    else {
        return (address.to_string(), String::new());
    };

    let rest = format!("{}{}", &address[..m.start()], &address[m.end()..]);
    (tidy_separators(&rest), m.as_str().to_string())
}

fn tidy_separators(s: &str) -> String {
    let s = re_separator_run().replace_all(s, ", ");
    let s = re_space_before_comma().replace_all(&s, ",");
    let s = re_space_run().replace_all(&s, " ");
    s.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '-')
        .to_string()
}
