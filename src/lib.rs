//! seqtargets computes the expected output file paths of RNA-seq and
//! ChIP-seq pipelines from declarative pattern trees and a sample table.
//!
//! The engine walks nested YAML pattern trees, fills `{name}` placeholders
//! from per-axis value lists (cartesian or zipped), and merges per-stage
//! results into one target tree a workflow engine can consume either as a
//! nested mapping or as a flat path list. It only computes paths; nothing
//! is executed.

pub mod config;
pub mod error;
pub mod fill;
pub mod label;
pub mod nested;
pub mod sample_table;
pub mod targets;

pub use config::{ChipSeqConfig, PipelineConfig, RnaSeqConfig};
pub use error::TargetsError;
pub use fill::{fill_patterns, Axis, Combination, FillMap};
pub use label::boolean_labels;
pub use nested::{collapse_key, deep_merge, flatten, map_leaves, Node};
pub use sample_table::SampleTable;
pub use targets::{Stage, TargetAssembler};
