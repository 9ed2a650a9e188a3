//! Pipeline configuration and the RNA-seq / ChIP-seq target front-ends.
//!
//! A configuration YAML names the sample table, the output directories and,
//! for ChIP-seq, which run identifiers each peak-calling algorithm has. The
//! front-ends turn config + sample table + pattern tree into stages for the
//! [`TargetAssembler`] and expose the merged target tree.

use crate::error::TargetsError;
use crate::fill::{Axis, Combination, FillMap};
use crate::nested::{deep_merge, flatten, Node};
use crate::sample_table::SampleTable;
use crate::targets::{Stage, TargetAssembler};
use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_RNASEQ_PATTERNS: &str = include_str!("../assets/rnaseq_patterns.yaml");
const DEFAULT_CHIPSEQ_PATTERNS: &str = include_str!("../assets/chipseq_patterns.yaml");

fn default_sample_dir() -> String {
    "samples".to_string()
}

fn default_aggregation_dir() -> String {
    "aggregation".to_string()
}

fn default_merged_dir() -> String {
    "merged".to_string()
}

fn default_peaks_dir() -> String {
    "chipseq".to_string()
}

/// The resolved pipeline configuration document.
#[derive(Clone, Debug, Deserialize)]
pub struct PipelineConfig {
    pub assembly: String,
    /// Sample-table path, relative to the config file.
    pub sampletable: String,
    #[serde(default = "default_sample_dir")]
    pub sample_dir: String,
    #[serde(default = "default_aggregation_dir")]
    pub aggregation_dir: String,
    #[serde(default = "default_merged_dir")]
    pub merged_dir: String,
    #[serde(default = "default_peaks_dir")]
    pub peaks_dir: String,
    /// Peak-calling algorithm name -> ordered run identifiers.
    #[serde(default)]
    pub peak_calling: IndexMap<String, Vec<String>>,
    /// Optional path to a pattern YAML overriding the built-in one.
    #[serde(default)]
    pub patterns: Option<String>,
}

impl PipelineConfig {
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read config '{path}': {e}"))?;
        Self::from_yaml_str(&text).map_err(|e| anyhow!("Could not parse config '{path}': {e}"))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

fn config_base_dir(config_path: &str) -> PathBuf {
    Path::new(config_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_path(base: &Path, path: &str) -> String {
    if Path::new(path).is_absolute() {
        path.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn patterns_from_file(path: &str) -> Result<Node> {
    let text =
        fs::read_to_string(path).map_err(|e| anyhow!("Could not read patterns '{path}': {e}"))?;
    Node::from_yaml_str(&text).map_err(|e| anyhow!("Could not parse patterns '{path}': {e}"))
}

fn load_patterns(config: &PipelineConfig, base: &Path, default_text: &str) -> Result<Node> {
    match &config.patterns {
        Some(path) => patterns_from_file(&resolve_path(base, path)),
        None => Node::from_yaml_str(default_text)
            .map_err(|e| anyhow!("Could not parse built-in patterns: {e}")),
    }
}

/// RNA-seq targets: one cartesian stage over the sample axis.
#[derive(Clone, Debug)]
pub struct RnaSeqConfig {
    config: PipelineConfig,
    sample_table: SampleTable,
    patterns: Node,
    targets: Node,
}

impl RnaSeqConfig {
    pub fn from_config_file(config_path: &str) -> Result<Self> {
        let config = PipelineConfig::from_yaml_file(config_path)?;
        let base = config_base_dir(config_path);
        let sample_table = SampleTable::from_tsv_file(&resolve_path(&base, &config.sampletable))?;
        let patterns = load_patterns(&config, &base, DEFAULT_RNASEQ_PATTERNS)?;
        Self::new(config, sample_table, patterns)
    }

    pub fn new(config: PipelineConfig, sample_table: SampleTable, patterns: Node) -> Result<Self> {
        let mut fill = FillMap::new();
        fill.insert(
            "sample".to_string(),
            Axis::List(sample_table.samples().to_vec()),
        );
        fill.insert("sample_dir".to_string(), Axis::from(config.sample_dir.clone()));
        fill.insert(
            "agg_dir".to_string(),
            Axis::from(config.aggregation_dir.clone()),
        );

        let mut assembler = TargetAssembler::new();
        assembler.add_stage(Stage::new(
            "rnaseq",
            patterns.clone(),
            fill,
            Combination::Cartesian,
        ));
        let targets = assembler.build_targets()?;
        Ok(Self {
            config,
            sample_table,
            patterns,
            targets,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sample_table(&self) -> &SampleTable {
        &self.sample_table
    }

    pub fn patterns(&self) -> &Node {
        &self.patterns
    }

    pub fn targets(&self) -> &Node {
        &self.targets
    }

    pub fn flat_targets(&self) -> Vec<String> {
        flatten(&self.targets)
    }
}

/// ChIP-seq targets: a cartesian by-sample stage plus one zipped stage per
/// configured peak-calling algorithm.
#[derive(Clone, Debug)]
pub struct ChipSeqConfig {
    config: PipelineConfig,
    sample_table: SampleTable,
    patterns_by_sample: Node,
    patterns_by_peaks: Node,
    patterns: Node,
    targets_by_sample: Node,
    targets_for_peaks: Node,
    targets: Node,
}

impl ChipSeqConfig {
    pub fn from_config_file(config_path: &str) -> Result<Self> {
        let config = PipelineConfig::from_yaml_file(config_path)?;
        let base = config_base_dir(config_path);
        let sample_table = SampleTable::from_tsv_file(&resolve_path(&base, &config.sampletable))?;
        let patterns = load_patterns(&config, &base, DEFAULT_CHIPSEQ_PATTERNS)?;
        Self::new(config, sample_table, patterns)
    }

    /// `patterns` must be a mapping with the two top-level blocks
    /// `patterns_by_sample` and `patterns_by_peaks`.
    pub fn new(config: PipelineConfig, sample_table: SampleTable, patterns: Node) -> Result<Self> {
        let patterns_by_sample = patterns
            .get("patterns_by_sample")
            .ok_or_else(|| anyhow!("ChIP-seq patterns lack a 'patterns_by_sample' block"))?
            .clone();
        let patterns_by_peaks = patterns
            .get("patterns_by_peaks")
            .ok_or_else(|| anyhow!("ChIP-seq patterns lack a 'patterns_by_peaks' block"))?
            .clone();

        let mut fill_by_sample = FillMap::new();
        fill_by_sample.insert(
            "sample".to_string(),
            Axis::List(sample_table.samples().to_vec()),
        );
        fill_by_sample.insert(
            "sample_dir".to_string(),
            Axis::from(config.sample_dir.clone()),
        );
        fill_by_sample.insert(
            "agg_dir".to_string(),
            Axis::from(config.aggregation_dir.clone()),
        );
        fill_by_sample.insert(
            "merged_dir".to_string(),
            Axis::from(config.merged_dir.clone()),
        );
        fill_by_sample.insert(
            "peak_calling".to_string(),
            Axis::from(config.peaks_dir.clone()),
        );
        fill_by_sample.insert("label".to_string(), Axis::List(sample_table.labels()?));
        fill_by_sample.insert("ip_label".to_string(), Axis::List(sample_table.ip_labels()?));

        let mut by_sample_assembler = TargetAssembler::new();
        by_sample_assembler.add_stage(Stage::new(
            "chipseq_by_sample",
            patterns_by_sample.clone(),
            fill_by_sample.clone(),
            Combination::Cartesian,
        ));
        let targets_by_sample = by_sample_assembler.build_targets()?;

        let mut peaks_assembler = TargetAssembler::new();
        for (algorithm, runs) in &config.peak_calling {
            let template = Self::project_algorithm(&patterns_by_peaks, algorithm)?;
            let mut fill = FillMap::new();
            fill.insert(
                "peak_calling".to_string(),
                Axis::from(config.peaks_dir.clone()),
            );
            fill.insert(format!("{algorithm}_run"), Axis::List(runs.clone()));
            peaks_assembler.add_stage(Stage::new(
                algorithm.clone(),
                template,
                fill,
                Combination::Zip,
            ));
        }
        let targets_for_peaks = peaks_assembler.build_targets()?;

        let targets = deep_merge(&targets_by_sample, &targets_for_peaks);
        let patterns = deep_merge(&patterns_by_sample, &patterns_by_peaks);
        Ok(Self {
            config,
            sample_table,
            patterns_by_sample,
            patterns_by_peaks,
            patterns,
            targets_by_sample,
            targets_for_peaks,
            targets,
        })
    }

    /// Restrict each `patterns_by_peaks` entry to one algorithm's
    /// sub-pattern, keeping the entry keys and the algorithm key around it.
    fn project_algorithm(patterns_by_peaks: &Node, algorithm: &str) -> Result<Node, TargetsError> {
        let entries = patterns_by_peaks.as_map().ok_or_else(|| {
            TargetsError::String("'patterns_by_peaks' is not a mapping".to_string())
        })?;
        let mut out = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let sub = value.get(algorithm).ok_or_else(|| {
                TargetsError::String(format!(
                    "'patterns_by_peaks' entry '{key}' has no pattern for algorithm '{algorithm}'"
                ))
            })?;
            out.insert(
                key.clone(),
                Node::Map(IndexMap::from([(algorithm.to_string(), sub.clone())])),
            );
        }
        Ok(Node::Map(out))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sample_table(&self) -> &SampleTable {
        &self.sample_table
    }

    pub fn patterns_by_sample(&self) -> &Node {
        &self.patterns_by_sample
    }

    pub fn patterns_by_peaks(&self) -> &Node {
        &self.patterns_by_peaks
    }

    /// Both pattern blocks merged into one tree.
    pub fn patterns(&self) -> &Node {
        &self.patterns
    }

    pub fn targets_by_sample(&self) -> &Node {
        &self.targets_by_sample
    }

    pub fn targets_for_peaks(&self) -> &Node {
        &self.targets_for_peaks
    }

    /// The full target tree: by-sample targets with every algorithm's peak
    /// targets layered in.
    pub fn targets(&self) -> &Node {
        &self.targets
    }

    pub fn flat_targets(&self) -> Vec<String> {
        flatten(&self.targets)
    }
}
