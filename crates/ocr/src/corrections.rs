use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Invalid correction pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Regex rule '{0}' is not allowed in a literal-only table")]
    RegexInLiteralTable(String),
    #[error("Failed to parse correction table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to read correction table: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionKind {
    #[default]
    Literal,
    Regex,
}

/// One (pattern, replacement) pair. Regex replacements may use `$1`-style groups;
/// literal replacements are inserted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrectionRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub kind: CorrectionKind,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl CorrectionRule {
    pub fn literal(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            kind: CorrectionKind::Literal,
            case_sensitive: true,
        }
    }

    pub fn regex(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            kind: CorrectionKind::Regex,
            case_sensitive: false,
        }
    }
}

#[derive(Deserialize)]
struct TableFile {
    #[serde(rename = "rule", default)]
    rules: Vec<CorrectionRule>,
}

enum Matcher {
    Exact(String),
    Pattern(Regex),
}

struct CompiledRule {
    rule: CorrectionRule,
    matcher: Matcher,
}

impl CompiledRule {
    fn compile(rule: CorrectionRule) -> Result<Self, CorrectionError> {
        let matcher = match (rule.kind, rule.case_sensitive) {
            (CorrectionKind::Literal, true) => Matcher::Exact(rule.pattern.clone()),
            (CorrectionKind::Literal, false) => Matcher::Pattern(build(&regex::escape(&rule.pattern), &rule)?),
            (CorrectionKind::Regex, _) => Matcher::Pattern(build(&rule.pattern, &rule)?),
        };
        Ok(Self { rule, matcher })
    }

    fn apply(&self, text: &str) -> String {
        match (&self.matcher, self.rule.kind) {
            (Matcher::Exact(p), _) => text.replace(p.as_str(), &self.rule.replacement),
            (Matcher::Pattern(re), CorrectionKind::Literal) => {
                re.replace_all(text, NoExpand(&self.rule.replacement)).into_owned()
            }
            (Matcher::Pattern(re), CorrectionKind::Regex) => {
                re.replace_all(text, self.rule.replacement.as_str()).into_owned()
            }
        }
    }
}

fn build(pattern: &str, rule: &CorrectionRule) -> Result<Regex, CorrectionError> {
    RegexBuilder::new(pattern)
        .case_insensitive(!rule.case_sensitive)
        .build()
        .map_err(|source| CorrectionError::Pattern { pattern: rule.pattern.clone(), source })
}

/// Ordered, immutable list of known OCR misreads. Each rule runs on the output of the previous one.
pub struct CorrectionTable {
    rules: Vec<CompiledRule>,
}

impl CorrectionTable {
    pub fn new(rules: Vec<CorrectionRule>) -> Result<Self, CorrectionError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Parse a table of `[[rule]]` entries.
    pub fn from_toml(toml_content: &str) -> Result<Self, CorrectionError> {
        let file: TableFile = toml::from_str(toml_content)?;
        Self::new(file.rules)
    }

    pub fn from_file(path: &Path) -> Result<Self, CorrectionError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, r| r.apply(&acc))
    }

    pub fn rules(&self) -> impl Iterator<Item = &CorrectionRule> {
        self.rules.iter().map(|r| &r.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whole-text misreads of the card boilerplate and field labels.
    pub fn default_normalizer() -> Self {
        Self::new(default_normalizer_rules()).expect("built-in normalizer table is valid")
    }

    /// Per-line address clean-up: place-name garbles, then punctuation and spacing.
    pub fn default_address() -> Self {
        Self::new(default_address_rules()).expect("built-in address table is valid")
    }
}

pub fn default_normalizer_rules() -> Vec<CorrectionRule> {
    [
        ("G0VERNMENT", "GOVERNMENT"),
        ("GOVERNMENT 0F", "GOVERNMENT OF"),
        ("Governrnent", "Government"),
        ("lNDIA", "INDIA"),
        ("1NDIA", "INDIA"),
        ("D0B", "DOB"),
        ("DoB", "DOB"),
        ("D.O.B", "DOB"),
        ("DOB;", "DOB:"),
        ("Date of Birth;", "Date of Birth:"),
        ("Fernale", "Female"),
        ("FERNALE", "FEMALE"),
        ("Maie", "Male"),
        ("MAIE", "MALE"),
    ]
    .into_iter()
    .map(|(p, r)| CorrectionRule::literal(p, r))
    .collect()
}

pub fn default_address_rules() -> Vec<CorrectionRule> {
    [
        // Place names
        (r"\bKer[ae]l[ae]\b", "Kerala"),
        (r"\bKozh[il1]k{1,2}od[ae]\b", "Kozhikode"),
        (r"\bMa[l1]ap{1,2}uram\b", "Malappuram"),
        (r"\bErnaku[l1]a(?:m|rn)\b", "Ernakulam"),
        (r"\bThr[il1]ss[uv]r\b", "Thrissur"),
        (r"\bKann[uv]r\b", "Kannur"),
        // Issuer boilerplate and labels
        (r"^.*\bUnique\s+Identification\s+Authority\b.*$", ""),
        (r"^.*\bGovernment\s+of\s+India\b.*$", ""),
        (r"^(?:Address|Addr)\s*[:;.]?\s*", ""),
        // Abbreviations
        (r"\b([SDWC])\s*/\s*[O0]\b", "$1/O"),
        (r"\bP\s*\.?\s*O\b\.?", "P.O."),
        (r"\bDist\b\.?", "District"),
        // Punctuation and spacing
        (r",(?:\s*,)+", ","),
        (r"\s+,", ","),
        (r",(\S)", ", $1"),
        (r"\s{2,}", " "),
        (r"^[\s,.:;\-]+", ""),
        (r"[\s,:;\-]+$", ""),
    ]
    .into_iter()
    .map(|(p, r)| CorrectionRule::regex(p, r))
    .collect()
}
