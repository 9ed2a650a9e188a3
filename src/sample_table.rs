//! TSV sample-table reader.
//!
//! The first column holds the unique sample name. ChIP-seq configs
//! additionally use a `label` column and an `antibody` column; rows whose
//! antibody is `input` are the non-IP controls and are excluded from the
//! IP-only label axis.

use anyhow::{anyhow, Result};
use csv::ReaderBuilder;
use std::fs;

const INPUT_ANTIBODY: &str = "input";

#[derive(Clone, Debug, Default)]
pub struct SampleTable {
    samples: Vec<String>,
    labels: Option<Vec<String>>,
    antibodies: Option<Vec<String>>,
}

impl SampleTable {
    pub fn from_tsv_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read sample table '{path}': {e}"))?;
        Self::from_text(&text)
    }

    pub fn from_text(tsv_text: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(tsv_text.as_bytes());

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(anyhow!("Sample table has no columns"));
        }
        let label_col = headers.iter().position(|h| h == "label");
        let antibody_col = headers.iter().position(|h| h == "antibody");

        let mut samples = Vec::new();
        let mut labels = label_col.map(|_| Vec::new());
        let mut antibodies = antibody_col.map(|_| Vec::new());
        for record in rdr.records() {
            let record = record?;
            let sample = record
                .get(0)
                .ok_or_else(|| anyhow!("Sample table row has no sample name"))?;
            if sample.is_empty() {
                return Err(anyhow!("Sample table row has an empty sample name"));
            }
            samples.push(sample.to_string());
            if let (Some(col), Some(values)) = (label_col, labels.as_mut()) {
                values.push(record.get(col).unwrap_or_default().to_string());
            }
            if let (Some(col), Some(values)) = (antibody_col, antibodies.as_mut()) {
                values.push(record.get(col).unwrap_or_default().to_string());
            }
        }
        Ok(Self {
            samples,
            labels,
            antibodies,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// The label column, required for ChIP-seq target generation.
    pub fn labels(&self) -> Result<Vec<String>> {
        self.labels
            .clone()
            .ok_or_else(|| anyhow!("Sample table has no 'label' column"))
    }

    /// Labels of the IP samples, i.e. rows whose antibody is not `input`.
    pub fn ip_labels(&self) -> Result<Vec<String>> {
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| anyhow!("Sample table has no 'label' column"))?;
        let antibodies = self
            .antibodies
            .as_ref()
            .ok_or_else(|| anyhow!("Sample table has no 'antibody' column"))?;
        Ok(labels
            .iter()
            .zip(antibodies)
            .filter(|(_, antibody)| *antibody != INPUT_ANTIBODY)
            .map(|(label, _)| label.clone())
            .collect())
    }
}
