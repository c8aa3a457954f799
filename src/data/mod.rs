//! Censored observation records and the normalized dataset built from them

pub mod builder;
pub mod dataset;
pub mod observation;
pub mod parser;

pub use builder::{DatasetBuilder, DatasetBuilderExt};
pub use dataset::{CensoredDataset, LabelOverride, UnitHistory};
pub use observation::{CensoringKind, Observation};
pub use parser::{read_csv, read_csv_from};
