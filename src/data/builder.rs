use crate::data::*;
use crate::error::DataError;

pub trait DatasetBuilderExt {
    fn builder() -> DatasetBuilder;
}

impl DatasetBuilderExt for CensoredDataset {
    fn builder() -> DatasetBuilder {
        DatasetBuilder {
            records: Vec::new(),
            current_unit: None,
            relevance_time: 0.0,
        }
    }
}

/// Fluent construction of a [`CensoredDataset`]
///
/// Records added after [`DatasetBuilder::unit`] belong to that unit until the next
/// call.
///
/// ```rust
/// use reliakit::prelude::*;
///
/// let dataset = CensoredDataset::builder()
///     .unit("A")
///     .event(5.0)
///     .event(8.0)
///     .unit("B")
///     .right_censored(12.0)
///     .build()
///     .unwrap();
/// assert_eq!(dataset.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    records: Vec<Observation>,
    current_unit: Option<String>,
    relevance_time: f64,
}

impl DatasetBuilder {
    /// Attribute subsequent records to `unit_id`
    pub fn unit(mut self, unit_id: impl Into<String>) -> Self {
        self.current_unit = Some(unit_id.into());
        self
    }

    pub fn observation(mut self, mut observation: Observation) -> Self {
        if observation.unit_id.is_none() {
            observation.unit_id = self.current_unit.clone();
        }
        self.records.push(observation);
        self
    }

    pub fn event(self, time: f64) -> Self {
        self.observation(Observation::event(time))
    }

    pub fn right_censored(self, time: f64) -> Self {
        self.observation(Observation::right_censored(time))
    }

    pub fn left_censored(self, time: f64) -> Self {
        self.observation(Observation::left_censored(time))
    }

    pub fn interval(self, left: f64, right: f64) -> Self {
        self.observation(Observation::interval(left, right))
    }

    /// Add a record with a textual status label
    pub fn record(self, left: f64, right: f64, label: &str) -> Self {
        self.observation(Observation::from_label(left, right, label))
    }

    /// Set the multiplicity of the most recently added record
    pub fn times(mut self, multiplicity: u32) -> Self {
        if let Some(last) = self.records.last_mut() {
            last.multiplicity = multiplicity;
        }
        self
    }

    /// Drop records whose left time lies beyond `time`
    pub fn relevance_time(mut self, time: f64) -> Self {
        self.relevance_time = time;
        self
    }

    pub fn build(self) -> Result<CensoredDataset, DataError> {
        CensoredDataset::build(self.records, self.relevance_time)
    }
}
