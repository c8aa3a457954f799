//! A single failure or censoring record

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much is known about the failure time of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CensoringKind {
    /// Failure observed at an exact time
    Event,
    /// Still running at `left`; failure happens later
    RightCensored,
    /// Failed at some time before `right`
    LeftCensored,
    /// Failed somewhere in `[left, right]`
    IntervalCensored,
}

impl CensoringKind {
    /// Recode a textual status label
    ///
    /// The mapping is closed and case-sensitive: only `"Right Censored"`,
    /// `"Left Censored"` and `"Interval Censored"` are recognized, everything else is
    /// an [`CensoringKind::Event`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "Right Censored" => CensoringKind::RightCensored,
            "Left Censored" => CensoringKind::LeftCensored,
            "Interval Censored" => CensoringKind::IntervalCensored,
            _ => CensoringKind::Event,
        }
    }

    /// The canonical label, inverse of [`CensoringKind::from_label`]
    pub fn label(&self) -> &'static str {
        match self {
            CensoringKind::Event => "Event",
            CensoringKind::RightCensored => "Right Censored",
            CensoringKind::LeftCensored => "Left Censored",
            CensoringKind::IntervalCensored => "Interval Censored",
        }
    }

    /// Whether the record contributes a failure (as opposed to a suspension)
    #[inline]
    pub fn is_failure(&self) -> bool {
        !matches!(self, CensoringKind::RightCensored)
    }
}

impl From<&str> for CensoringKind {
    fn from(label: &str) -> Self {
        CensoringKind::from_label(label)
    }
}

impl fmt::Display for CensoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One failure/censoring record
///
/// `multiplicity` stands for that many identical records. Estimators treat it as a
/// weight and produce the same numbers as explicit replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub left: f64,
    pub right: f64,
    pub kind: CensoringKind,
    pub unit_id: Option<String>,
    pub multiplicity: u32,
}

impl Observation {
    pub fn new(left: f64, right: f64, kind: CensoringKind) -> Self {
        Self {
            left,
            right,
            kind,
            unit_id: None,
            multiplicity: 1,
        }
    }

    /// Build from a textual status label, see [`CensoringKind::from_label`]
    pub fn from_label(left: f64, right: f64, label: &str) -> Self {
        Self::new(left, right, CensoringKind::from_label(label))
    }

    /// Failure observed exactly at `time`
    pub fn event(time: f64) -> Self {
        Self::new(time, time, CensoringKind::Event)
    }

    /// Unit removed from test at `time` without failing
    pub fn right_censored(time: f64) -> Self {
        Self::new(time, f64::INFINITY, CensoringKind::RightCensored)
    }

    /// Failure found at inspection time `time`, occurred earlier
    pub fn left_censored(time: f64) -> Self {
        Self::new(0.0, time, CensoringKind::LeftCensored)
    }

    /// Failure between two inspections
    pub fn interval(left: f64, right: f64) -> Self {
        Self::new(left, right, CensoringKind::IntervalCensored)
    }

    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: u32) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Time used for rank and product-limit bookkeeping
    ///
    /// Event and right-censored records resolve at `left`, left-censored records at
    /// `right`, interval-censored records at the midpoint.
    #[inline]
    pub fn resolved_time(&self) -> f64 {
        match self.kind {
            CensoringKind::Event | CensoringKind::RightCensored => self.left,
            CensoringKind::LeftCensored => self.right,
            CensoringKind::IntervalCensored => 0.5 * (self.left + self.right),
        }
    }

    /// Multiplicity as a floating-point weight
    #[inline]
    pub fn weight(&self) -> f64 {
        self.multiplicity as f64
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }
}
