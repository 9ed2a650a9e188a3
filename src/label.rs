//! Deterministic labels for boolean include/exclude combinations, used to
//! name difference and intersection outputs ("exp1_AND_exp2_NOT_exp3").

use crate::error::TargetsError;

/// Connector words and the leading-prefix strip rule for [`boolean_labels`].
#[derive(Clone, Debug)]
pub struct LabelStyle {
    pub true_word: String,
    pub false_word: String,
    pub strip_prefix: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            true_word: "AND".to_string(),
            false_word: "NOT".to_string(),
            strip_prefix: "AND_".to_string(),
        }
    }
}

/// Encode `names` and an aligned boolean mask into one label with the
/// default AND/NOT connectors.
pub fn boolean_labels<S: AsRef<str>>(names: &[S], idx: &[bool]) -> Result<String, TargetsError> {
    boolean_labels_with(names, idx, &LabelStyle::default())
}

/// Like [`boolean_labels`] but with caller-chosen connector words.
///
/// Each name is prefixed with the connector for its boolean, the pieces are
/// joined with `_`, and exactly one leading `strip_prefix` occurrence is
/// removed. Names are taken verbatim, order preserved.
pub fn boolean_labels_with<S: AsRef<str>>(
    names: &[S],
    idx: &[bool],
    style: &LabelStyle,
) -> Result<String, TargetsError> {
    if names.len() != idx.len() {
        return Err(TargetsError::ShapeMismatch {
            axis: "boolean_labels".to_string(),
            expected: names.len(),
            found: idx.len(),
        });
    }
    let pieces: Vec<String> = names
        .iter()
        .zip(idx)
        .map(|(name, included)| {
            let word = if *included {
                &style.true_word
            } else {
                &style.false_word
            };
            format!("{word}_{}", name.as_ref())
        })
        .collect();
    let joined = pieces.join("_");
    Ok(match joined.strip_prefix(&style.strip_prefix) {
        Some(rest) => rest.to_string(),
        None => joined,
    })
}
