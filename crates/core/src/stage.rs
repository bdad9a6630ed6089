use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::record::Field;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stage: '{0}'")]
pub struct StageError(pub String);

/// One capture step. `Step1..Step3` drive the three-step wizard, `Front`/`Back`
/// the two-sided flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Step1,
    Step2,
    Step3,
    Front,
    Back,
}

/// Which extractor group a stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Identity,
    IdNumber,
    Address,
}

impl FieldGroup {
    pub fn fields(self) -> &'static [Field] {
        match self {
            FieldGroup::Identity => &[Field::Name, Field::Dob, Field::Gender, Field::Phone],
            FieldGroup::IdNumber => &[Field::Aadhaar],
            FieldGroup::Address => &[Field::Address, Field::Pincode],
        }
    }
}

impl Stage {
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Step1 => "step1",
            Stage::Step2 => "step2",
            Stage::Step3 => "step3",
            Stage::Front => "front",
            Stage::Back => "back",
        }
    }

    /// Status reported to the caller once this stage has been merged.
    pub fn success_status(self) -> String {
        format!("{}_processed", self.tag())
    }

    pub fn groups(self) -> &'static [FieldGroup] {
        match self {
            Stage::Step1 => &[FieldGroup::Identity],
            Stage::Step2 => &[FieldGroup::IdNumber],
            Stage::Step3 | Stage::Back => &[FieldGroup::Address],
            Stage::Front => &[FieldGroup::Identity, FieldGroup::IdNumber],
        }
    }

    /// The first stage of either flow starts a fresh document.
    pub fn resets_session(self) -> bool {
        matches!(self, Stage::Step1 | Stage::Front)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Stage {
    type Err = StageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "step1" => Ok(Stage::Step1),
            "step2" => Ok(Stage::Step2),
            "step3" => Ok(Stage::Step3),
            "front" => Ok(Stage::Front),
            "back" => Ok(Stage::Back),
            _ => Err(StageError(s.to_string())),
        }
    }
}
