use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of fields read off the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    #[serde(rename = "DOB")]
    Dob,
    Gender,
    Phone,
    Aadhaar,
    Address,
    Pincode,
}

impl Field {
    /// Export order.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Dob,
        Field::Gender,
        Field::Phone,
        Field::Aadhaar,
        Field::Address,
        Field::Pincode,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Dob => "DOB",
            Field::Gender => "Gender",
            Field::Phone => "Phone",
            Field::Aadhaar => "Aadhaar",
            Field::Address => "Address",
            Field::Pincode => "Pincode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How an empty incoming value treats a field that already holds something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Every key in the update wins, even when its value is empty.
    #[default]
    Overwrite,
    /// An empty value means "nothing found" and leaves the existing value alone.
    KeepExisting,
}

impl std::str::FromStr for MergePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "keep_existing" | "keep-existing" => Ok(MergePolicy::KeepExisting),
            other => Err(format!("Unknown merge policy: '{other}'")),
        }
    }
}

/// Partial result of one extractor run. Only the fields the extractor owns are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate(BTreeMap<Field, String>);

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Absorb another update; its keys win.
    pub fn extend(&mut self, other: FieldUpdate) {
        self.0.extend(other.0);
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The accumulated document. Every field is always present; unrecovered ones are `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DOB")]
    pub dob: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Aadhaar")]
    pub aadhaar: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Pincode")]
    pub pincode: String,
}

impl FieldRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Dob => &self.dob,
            Field::Gender => &self.gender,
            Field::Phone => &self.phone,
            Field::Aadhaar => &self.aadhaar,
            Field::Address => &self.address,
            Field::Pincode => &self.pincode,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Dob => &mut self.dob,
            Field::Gender => &mut self.gender,
            Field::Phone => &mut self.phone,
            Field::Aadhaar => &mut self.aadhaar,
            Field::Address => &mut self.address,
            Field::Pincode => &mut self.pincode,
        }
    }

    /// In-place shallow merge. Keys missing from `incoming` are never touched.
    pub fn merge_in(&mut self, incoming: &FieldUpdate, policy: MergePolicy) {
        for (field, value) in incoming.iter() {
            if value.is_empty() && policy == MergePolicy::KeepExisting {
                continue;
            }
            *self.slot_mut(field) = value.to_string();
        }
    }

    /// True when no field has a value.
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// `Key: Value` lines in export order.
    pub fn to_key_value_text(&self) -> String {
        Field::ALL
            .iter()
            .map(|f| format!("{}: {}\n", f.key(), self.get(*f)))
            .collect()
    }
}

/// Pure form of [`FieldRecord::merge_in`].
pub fn merge(existing: &FieldRecord, incoming: &FieldUpdate, policy: MergePolicy) -> FieldRecord {
    let mut merged = existing.clone();
    merged.merge_in(incoming, policy);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, dob: &str) -> FieldRecord {
        FieldRecord { name: name.into(), dob: dob.into(), ..Default::default() }
    }

    #[test]
    fn merge_fills_missing_field_and_keeps_others() {
        let merged = merge(
            &record("A", ""),
            &FieldUpdate::new().with(Field::Dob, "01/01/2000"),
            MergePolicy::Overwrite,
        );
        assert_eq!(merged, record("A", "01/01/2000"));
    }

    #[test]
    fn overwrite_policy_clears_with_empty_value() {
        let merged = merge(
            &record("A", "01/01/2000"),
            &FieldUpdate::new().with(Field::Dob, ""),
            MergePolicy::Overwrite,
        );
        assert_eq!(merged.dob, "");
        assert_eq!(merged.name, "A");
    }

    #[test]
    fn keep_existing_policy_ignores_empty_value() {
        let merged = merge(
            &record("A", "01/01/2000"),
            &FieldUpdate::new().with(Field::Dob, "").with(Field::Name, "B"),
            MergePolicy::KeepExisting,
        );
        assert_eq!(merged, record("B", "01/01/2000"));
    }

    #[test]
    fn record_json_has_exactly_the_closed_keys() {
        let value = serde_json::to_value(FieldRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), Field::ALL.len());
        for f in Field::ALL {
            assert_eq!(obj[f.key()], "");
        }
    }

    #[test]
    fn key_value_text_uses_fixed_order() {
        let r = FieldRecord { name: "Ajsal Ashraf".into(), pincode: "673001".into(), ..Default::default() };
        assert_eq!(
            r.to_key_value_text(),
            "Name: Ajsal Ashraf\nDOB: \nGender: \nPhone: \nAadhaar: \nAddress: \nPincode: 673001\n"
        );
    }

    #[test]
    fn merge_policy_from_str() {
        use std::str::FromStr;
        assert_eq!(MergePolicy::from_str("Overwrite").unwrap(), MergePolicy::Overwrite);
        assert_eq!(MergePolicy::from_str("keep_existing").unwrap(), MergePolicy::KeepExisting);
        assert!(MergePolicy::from_str("sometimes").is_err());
    }

    #[test]
    fn update_extend_later_keys_win() {
        let mut a = FieldUpdate::new().with(Field::Name, "A").with(Field::Phone, "");
        a.extend(FieldUpdate::new().with(Field::Phone, "9876543210"));
        assert_eq!(a.get(Field::Name), Some("A"));
        assert_eq!(a.get(Field::Phone), Some("9876543210"));
        assert_eq!(a.get(Field::Gender), None);
    }
}
