use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::record::{FieldRecord, FieldUpdate, MergePolicy};
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("No data has been extracted for this session")]
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// One document being captured, stage by stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub record: FieldRecord,
    pub stages: BTreeSet<Stage>,
    pub created_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            record: FieldRecord::default(),
            stages: BTreeSet::new(),
            created_at: now,
            touched_at: now,
        }
    }

    /// Merge one stage's output. A resetting stage discards everything gathered so far first.
    pub fn apply(&mut self, stage: Stage, update: &FieldUpdate, policy: MergePolicy, now: DateTime<Utc>) {
        if stage.resets_session() {
            self.record = FieldRecord::default();
            self.stages.clear();
        }
        self.record.merge_in(update, policy);
        self.stages.insert(stage);
        self.touched_at = now;
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.touched_at > ttl
    }

    /// Serialize the record as the downloadable `Key: Value` text. Fails while no field holds a value.
    pub fn export(&self) -> Result<String, ExportError> {
        if self.record.is_blank() {
            return Err(ExportError::NoData);
        }
        Ok(self.record.to_key_value_text())
    }
}
