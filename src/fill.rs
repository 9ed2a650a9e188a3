//! Placeholder expansion of pattern trees.

use crate::error::TargetsError;
use crate::nested::Node;
use indexmap::IndexMap;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid placeholder regex");
}

/// One axis of candidate values for a placeholder.
///
/// A scalar behaves as a one-value axis under the cartesian policy and
/// broadcasts under zip; lists zipped together must agree on length.
#[derive(Clone, Debug, PartialEq)]
pub enum Axis {
    Scalar(String),
    List(Vec<String>),
}

impl Axis {
    pub fn values(&self) -> &[String] {
        match self {
            Axis::Scalar(value) => std::slice::from_ref(value),
            Axis::List(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl From<&str> for Axis {
    fn from(value: &str) -> Self {
        Axis::Scalar(value.to_string())
    }
}

impl From<String> for Axis {
    fn from(value: String) -> Self {
        Axis::Scalar(value)
    }
}

impl From<Vec<String>> for Axis {
    fn from(values: Vec<String>) -> Self {
        Axis::List(values)
    }
}

impl From<Vec<&str>> for Axis {
    fn from(values: Vec<&str>) -> Self {
        Axis::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Placeholder name -> axis, in declaration order.
pub type FillMap = IndexMap<String, Axis>;

/// How multiple axes referenced by one pattern combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Combination {
    /// Every combination of axis values; the first-declared axis varies
    /// slowest.
    #[default]
    Cartesian,
    /// Position-aligned iteration; scalars broadcast, list lengths must
    /// match.
    Zip,
}

/// Placeholder names referenced by `pattern`, in order of first appearance,
/// deduplicated.
pub fn placeholder_names(pattern: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for m in PLACEHOLDER.find_iter(pattern) {
        let name = &pattern[m.start() + 1..m.end() - 1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Placeholder names referenced anywhere in a tree's leaves.
pub fn tree_placeholder_names(tree: &Node) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for leaf in crate::nested::flatten(tree) {
        for name in placeholder_names(&leaf) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Expand every leaf pattern of `template` against `fill` under `policy`.
///
/// Each leaf pattern becomes an ordered sequence of concrete strings, one
/// per combination (or zip step); a leaf that is itself a list of patterns
/// expands element by element into one flat sequence. The output order is
/// the iteration order, never deduplicated. Pure: neither input is touched.
pub fn fill_patterns(
    template: &Node,
    fill: &FillMap,
    policy: Combination,
) -> Result<Node, TargetsError> {
    match template {
        Node::Map(m) => {
            let mut out = IndexMap::with_capacity(m.len());
            for (key, value) in m {
                out.insert(key.clone(), fill_patterns(value, fill, policy)?);
            }
            Ok(Node::Map(out))
        }
        Node::Leaf(pattern) => {
            let expanded = expand_pattern(pattern, fill, policy)?;
            Ok(Node::Seq(expanded.into_iter().map(Node::Leaf).collect()))
        }
        Node::Seq(items) => {
            let mut out = Vec::new();
            for item in items {
                match fill_patterns(item, fill, policy)? {
                    Node::Seq(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            Ok(Node::Seq(out))
        }
    }
}

/// Expand one pattern string. A pattern without placeholders yields itself
/// as the sole result.
pub fn expand_pattern(
    pattern: &str,
    fill: &FillMap,
    policy: Combination,
) -> Result<Vec<String>, TargetsError> {
    let names = placeholder_names(pattern);
    if names.is_empty() {
        return Ok(vec![pattern.to_string()]);
    }
    for name in &names {
        if !fill.contains_key(name) {
            return Err(TargetsError::UnresolvedPlaceholder {
                pattern: pattern.to_string(),
                name: name.clone(),
            });
        }
    }

    // Referenced axes in fill-map declaration order, so every leaf of one
    // stage iterates its shared axes the same way.
    let axes: Vec<(&str, &Axis)> = fill
        .iter()
        .filter(|(key, _)| names.iter().any(|n| n == *key))
        .map(|(key, axis)| (key.as_str(), axis))
        .collect();

    match policy {
        Combination::Cartesian => {
            let mut results = Vec::new();
            for combo in axes
                .iter()
                .map(|(_, axis)| axis.values().iter())
                .multi_cartesian_product()
            {
                results.push(substitute(pattern, &axes, &combo)?);
            }
            Ok(results)
        }
        Combination::Zip => {
            let mut steps: Option<(usize, &str)> = None;
            for (name, axis) in &axes {
                if let Axis::List(values) = axis {
                    match steps {
                        None => steps = Some((values.len(), *name)),
                        Some((expected, _)) if values.len() != expected => {
                            return Err(TargetsError::ShapeMismatch {
                                axis: name.to_string(),
                                expected,
                                found: values.len(),
                            });
                        }
                        _ => {}
                    }
                }
            }
            let steps = steps.map(|(n, _)| n).unwrap_or(1);
            let mut results = Vec::with_capacity(steps);
            for i in 0..steps {
                let combo: Vec<&String> = axes
                    .iter()
                    .map(|(_, axis)| match axis {
                        Axis::Scalar(value) => value,
                        Axis::List(values) => &values[i],
                    })
                    .collect();
                results.push(substitute(pattern, &axes, &combo)?);
            }
            Ok(results)
        }
    }
}

/// Expand the read-number axis `{n}` of a paired-end pattern to 1 and 2
/// while leaving `{sample}` in place, producing the R1/R2 pattern pair for a
/// later per-sample fill.
pub fn expand_r1_r2(pattern: &str) -> Result<Vec<String>, TargetsError> {
    let mut fill = FillMap::new();
    fill.insert("sample".to_string(), Axis::from("{sample}"));
    fill.insert("n".to_string(), Axis::from(vec!["1", "2"]));
    expand_pattern(pattern, &fill, Combination::Cartesian)
}

fn substitute(
    pattern: &str,
    axes: &[(&str, &Axis)],
    combo: &[&String],
) -> Result<String, TargetsError> {
    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for m in PLACEHOLDER.find_iter(pattern) {
        let name = &pattern[m.start() + 1..m.end() - 1];
        let value = axes
            .iter()
            .position(|(axis_name, _)| *axis_name == name)
            .map(|idx| combo[idx])
            .ok_or_else(|| TargetsError::UnresolvedPlaceholder {
                pattern: pattern.to_string(),
                name: name.to_string(),
            })?;
        out.push_str(&pattern[last..m.start()]);
        out.push_str(value);
        last = m.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::flatten;

    fn fill_of(entries: &[(&str, Axis)]) -> FillMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_placeholder_names_order_and_dedup() {
        assert_eq!(
            placeholder_names("{a}/{b}/{a}.txt"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(placeholder_names("no/holes.txt").is_empty());
    }

    #[test]
    fn test_cartesian_counts_and_order() {
        let fill = fill_of(&[
            ("s", Axis::from(vec!["s1", "s2"])),
            ("n", Axis::from(vec!["1", "2", "3"])),
        ]);
        let out = expand_pattern("{s}_R{n}.fastq", &fill, Combination::Cartesian).unwrap();
        assert_eq!(out.len(), 6);
        // First-declared axis varies slowest.
        assert_eq!(
            out,
            vec![
                "s1_R1.fastq",
                "s1_R2.fastq",
                "s1_R3.fastq",
                "s2_R1.fastq",
                "s2_R2.fastq",
                "s2_R3.fastq"
            ]
        );
    }

    #[test]
    fn test_zip_counts_and_shape_mismatch() {
        let fill = fill_of(&[
            ("run", Axis::from(vec!["r1", "r2"])),
            ("peak", Axis::from(vec!["p1", "p2"])),
        ]);
        let out = expand_pattern("{run}/{peak}.bed", &fill, Combination::Zip).unwrap();
        assert_eq!(out, vec!["r1/p1.bed", "r2/p2.bed"]);

        let fill = fill_of(&[
            ("run", Axis::from(vec!["r1", "r2"])),
            ("peak", Axis::from(vec!["p1"])),
        ]);
        match expand_pattern("{run}/{peak}.bed", &fill, Combination::Zip) {
            Err(TargetsError::ShapeMismatch {
                axis,
                expected,
                found,
            }) => {
                assert_eq!(axis, "peak");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_zip_broadcasts_scalars() {
        let fill = fill_of(&[
            ("dir", Axis::from("chipseq")),
            ("run", Axis::from(vec!["r1", "r2"])),
        ]);
        let out = expand_pattern("{dir}/{run}/peaks.bed", &fill, Combination::Zip).unwrap();
        assert_eq!(out, vec!["chipseq/r1/peaks.bed", "chipseq/r2/peaks.bed"]);
    }

    #[test]
    fn test_missing_axis_is_unresolved_placeholder() {
        let fill = fill_of(&[("sample", Axis::from(vec!["s1"]))]);
        match expand_pattern("{sample_dir}/{sample}.bam", &fill, Combination::Cartesian) {
            Err(TargetsError::UnresolvedPlaceholder { name, .. }) => {
                assert_eq!(name, "sample_dir");
            }
            other => panic!("Expected UnresolvedPlaceholder, got {other:?}"),
        }
    }

    #[test]
    fn test_pattern_without_placeholders_passes_through() {
        let out = expand_pattern("aggregation/report.html", &FillMap::new(), Combination::Cartesian)
            .unwrap();
        assert_eq!(out, vec!["aggregation/report.html"]);
    }

    #[test]
    fn test_fill_patterns_two_leaf_template() {
        let template = Node::from_yaml_str(
            "bam: '{sample_dir}/{sample}.bam'\nbai: '{sample_dir}/{sample}.bam.bai'",
        )
        .unwrap();
        let fill = fill_of(&[
            ("sample_dir", Axis::from("samples")),
            ("sample", Axis::from(vec!["s1", "s2"])),
        ]);
        let out = fill_patterns(&template, &fill, Combination::Cartesian).unwrap();
        let expected = Node::from_yaml_str(
            "bam: [samples/s1.bam, samples/s2.bam]\nbai: [samples/s1.bam.bai, samples/s2.bam.bai]",
        )
        .unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_fill_patterns_seq_leaf_concatenates() {
        let template = Node::from_yaml_str("reads: ['{s}_R1.fq', '{s}_R2.fq']").unwrap();
        let fill = fill_of(&[("s", Axis::from(vec!["a", "b"]))]);
        let out = fill_patterns(&template, &fill, Combination::Cartesian).unwrap();
        assert_eq!(
            out,
            Node::from_yaml_str("reads: [a_R1.fq, b_R1.fq, a_R2.fq, b_R2.fq]").unwrap()
        );
    }

    #[test]
    fn test_fill_patterns_is_pure_and_idempotent() {
        let template = Node::from_yaml_str("bam: '{sample}.bam'").unwrap();
        let fill = fill_of(&[("sample", Axis::from(vec!["s1", "s2"]))]);
        let first = fill_patterns(&template, &fill, Combination::Cartesian).unwrap();
        let second = fill_patterns(&template, &fill, Combination::Cartesian).unwrap();
        assert_eq!(first, second);
        assert_eq!(template, Node::from_yaml_str("bam: '{sample}.bam'").unwrap());
    }

    #[test]
    fn test_expand_r1_r2_keeps_sample_placeholder() {
        let out = expand_r1_r2("{sample_dir}/{sample}/{sample}_R{n}.fastq.gz");
        // {sample_dir} is not on the partial fill's axes.
        assert!(matches!(
            out,
            Err(TargetsError::UnresolvedPlaceholder { name, .. }) if name == "sample_dir"
        ));

        let out = expand_r1_r2("{sample}_R{n}.fastq.gz").unwrap();
        assert_eq!(out, vec!["{sample}_R1.fastq.gz", "{sample}_R2.fastq.gz"]);
    }

    #[test]
    fn test_tree_placeholder_names() {
        let template =
            Node::from_yaml_str("a: '{x}/{y}'\nb: {c: '{y}/{z}'}").unwrap();
        assert_eq!(
            tree_placeholder_names(&template),
            vec!["x".to_string(), "y".to_string(), "z".to_string()]
        );
    }

    #[test]
    fn test_single_leaf_stays_a_sequence() {
        let template = Node::from_yaml_str("report: '{agg_dir}/report.html'").unwrap();
        let fill = fill_of(&[("agg_dir", Axis::from("aggregation"))]);
        let out = fill_patterns(&template, &fill, Combination::Cartesian).unwrap();
        assert_eq!(
            out.get("report"),
            Some(&Node::Seq(vec![Node::leaf("aggregation/report.html")]))
        );
        assert_eq!(flatten(&out), vec!["aggregation/report.html"]);
    }
}
