//! On-demand structural diagnostic.
//!
//! Unlike startup recovery, which only cares whether a record parses, this
//! checks the shape of every record and reports. It never modifies anything:
//! a record that parses but is structurally wrong is left for a human.

use crate::model::Hunt;
use crate::store::backend::StorageBackend;
use log::warn;
use serde::Serialize;
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "name",
    "targetSpecies",
    "count",
    "phases",
    "createdAt",
    "updatedAt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Valid,
    InvalidStructure,
    ParseError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityDetail {
    pub file: String,
    pub status: IntegrityStatus,
    /// Hunt name, when the record parsed far enough to have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub valid: usize,
    /// Structurally invalid plus unparseable.
    pub corrupted: usize,
    pub details: Vec<IntegrityDetail>,
}

/// Structural check of a raw record: required fields present, `count` a
/// non-negative number, `phases` an array whose entries have a non-empty
/// `id`, a non-empty `species` and a numeric `atCount`.
pub fn validate_value(record: &Value) -> bool {
    let Some(obj) = record.as_object() else {
        return false;
    };
    if REQUIRED_FIELDS.iter().any(|field| !obj.contains_key(*field)) {
        return false;
    }
    if !obj["count"].as_f64().is_some_and(|count| count >= 0.0) {
        return false;
    }
    let Some(phases) = obj["phases"].as_array() else {
        return false;
    };
    phases.iter().all(|phase| {
        non_empty_str(&phase["id"]) && non_empty_str(&phase["species"]) && phase["atCount"].is_number()
    })
}

/// The same rules applied to a typed hunt. Only the phase strings can fail.
pub fn validate(hunt: &Hunt) -> bool {
    !hunt.id.is_empty()
        && hunt
            .phases
            .iter()
            .all(|phase| !phase.id.is_empty() && !phase.species.is_empty())
}

fn non_empty_str(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

/// Checks every canonical record. Details are ordered by file name.
pub fn check_integrity<B: StorageBackend>(backend: &B) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    let mut ids = match backend.list_record_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("could not list hunts for the integrity check: {}", e);
            return report;
        }
    };
    ids.sort();

    for id in ids {
        let file = format!("{}.json", id);
        let parsed = backend
            .read_record(&id)
            .and_then(|bytes| Ok(serde_json::from_slice::<Value>(&bytes.unwrap_or_default())?));

        let detail = match parsed {
            Ok(value) => {
                let valid = validate_value(&value);
                let hunt = value
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string);
                if valid {
                    report.valid += 1;
                    IntegrityDetail {
                        file,
                        status: IntegrityStatus::Valid,
                        hunt,
                        error: None,
                    }
                } else {
                    report.corrupted += 1;
                    IntegrityDetail {
                        file,
                        status: IntegrityStatus::InvalidStructure,
                        hunt: Some(hunt.unwrap_or_else(|| "Unknown".to_string())),
                        error: None,
                    }
                }
            }
            Err(e) => {
                report.corrupted += 1;
                IntegrityDetail {
                    file,
                    status: IntegrityStatus::ParseError,
                    hunt: None,
                    error: Some(e.to_string()),
                }
            }
        };
        report.details.push(detail);
    }
    report
}
