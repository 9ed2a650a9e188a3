//! Per-stage expansion and assembly of the final target tree.

use crate::error::TargetsError;
use crate::fill::{fill_patterns, tree_placeholder_names, Combination, FillMap};
use crate::nested::{deep_merge, flatten, Node};

/// One pipeline stage: a pattern tree plus the axes and policy used to
/// expand it.
///
/// The required axis names are taken from the template's placeholders at
/// construction time, so a fill/template mismatch surfaces as
/// [`TargetsError::MissingAxis`] before any expansion runs.
#[derive(Clone, Debug)]
pub struct Stage {
    name: String,
    template: Node,
    fill: FillMap,
    policy: Combination,
    required: Vec<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>, template: Node, fill: FillMap, policy: Combination) -> Self {
        let required = tree_placeholder_names(&template);
        Self {
            name: name.into(),
            template,
            fill,
            policy,
            required,
        }
    }

    /// Declare an extra axis the fill map must carry even though no leaf of
    /// the template references it.
    pub fn require_axis(mut self, axis: impl Into<String>) -> Self {
        let axis = axis.into();
        if !self.required.contains(&axis) {
            self.required.push(axis);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &Node {
        &self.template
    }

    pub fn validate(&self) -> Result<(), TargetsError> {
        for axis in &self.required {
            if !self.fill.contains_key(axis) {
                return Err(TargetsError::MissingAxis {
                    stage: self.name.clone(),
                    axis: axis.clone(),
                });
            }
        }
        Ok(())
    }

    fn expand(&self) -> Result<Node, TargetsError> {
        fill_patterns(&self.template, &self.fill, self.policy)
    }
}

/// Folds per-stage expansions into one target tree.
///
/// Stages are expanded in the order they were added and merged with
/// [`deep_merge`], so later stages may add or override keys but never drop
/// earlier ones. Any stage error aborts the whole build; there is no
/// partial target tree.
#[derive(Clone, Debug, Default)]
pub struct TargetAssembler {
    stages: Vec<Stage>,
}

impl TargetAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Expand every stage and merge the results in stage order.
    pub fn build_targets(&self) -> Result<Node, TargetsError> {
        for stage in &self.stages {
            stage.validate()?;
        }
        let mut merged = Node::empty_map();
        for stage in &self.stages {
            merged = deep_merge(&merged, &stage.expand()?);
        }
        Ok(merged)
    }

    /// The flat ordered path list derived from [`Self::build_targets`].
    pub fn flat_targets(&self) -> Result<Vec<String>, TargetsError> {
        Ok(flatten(&self.build_targets()?))
    }
}
