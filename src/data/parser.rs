//! CSV reader for censored failure data
//!
//! Expected columns (case-insensitive headers, `#` starts a comment line):
//!
//! | column | required | meaning |
//! | --- | --- | --- |
//! | `left` | yes | left time bound |
//! | `right` | no | right time bound; empty means `+∞` for right-censored rows and `left` otherwise |
//! | `status` | no | censoring label, see [`CensoringKind::from_label`]; empty means Event |
//! | `unit` | no | unit id, needed for recurrence analysis |
//! | `quantity` | no | multiplicity, defaults to 1 |

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::data::{CensoredDataset, CensoringKind, Observation};
use crate::error::DataError;

#[derive(Debug, Clone, Deserialize)]
struct Row {
    left: f64,
    #[serde(default)]
    right: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    quantity: Option<u32>,
}

impl Row {
    fn into_observation(self) -> Observation {
        let kind = CensoringKind::from_label(self.status.as_deref().unwrap_or("Event"));
        let right = match (self.right, kind) {
            (Some(right), _) => right,
            (None, CensoringKind::RightCensored) => f64::INFINITY,
            (None, _) => self.left,
        };
        let mut observation = Observation::new(self.left, right, kind)
            .with_multiplicity(self.quantity.unwrap_or(1));
        observation.unit_id = self.unit.filter(|u| !u.is_empty());
        observation
    }
}

/// Read a CSV file into a [`CensoredDataset`]
///
/// ```rust,no_run
/// use reliakit::data::read_csv;
///
/// let dataset = read_csv("field_returns.csv", 0.0).unwrap();
/// println!("{} records", dataset.len());
/// ```
pub fn read_csv(path: impl AsRef<Path>, relevance_time: f64) -> Result<CensoredDataset, DataError> {
    let reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect(reader, relevance_time)
}

/// Read CSV data from any reader into a [`CensoredDataset`]
pub fn read_csv_from<R: Read>(source: R, relevance_time: f64) -> Result<CensoredDataset, DataError> {
    let reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    collect(reader, relevance_time)
}

fn collect<R: Read>(mut reader: csv::Reader<R>, relevance_time: f64) -> Result<CensoredDataset, DataError> {
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<Vec<_>>();
    reader.set_headers(csv::StringRecord::from(headers));

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: Row = row?;
        records.push(row.into_observation());
    }
    CensoredDataset::build(records, relevance_time)
}
