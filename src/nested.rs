//! Nested pattern/target trees and the recursive operations on them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in a pattern or target tree.
///
/// Pattern trees come straight out of YAML: mappings of mappings whose leaves
/// are path patterns (or lists of them). After expansion the same shape holds
/// concrete paths instead of patterns. Key order is document order, so every
/// traversal of a tree is deterministic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(String),
    Seq(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    pub fn leaf(s: impl Into<String>) -> Self {
        Node::Leaf(s.into())
    }

    pub fn empty_map() -> Self {
        Node::Map(IndexMap::new())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Value at `key` if this node is a mapping containing it.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Leaf(s.to_string())
    }
}

/// Recursively merge `overlay` into `base` and return the result.
///
/// Mappings merge key by key; anything else in `overlay` wins wholesale.
/// Keys of `base` not present in `overlay` survive at every depth, and
/// neither argument is mutated.
pub fn deep_merge(base: &Node, overlay: &Node) -> Node {
    match (base, overlay) {
        (Node::Map(b), Node::Map(o)) => {
            let mut merged = b.clone();
            for (key, value) in o {
                let new_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), new_value);
            }
            Node::Map(merged)
        }
        _ => overlay.clone(),
    }
}

/// Apply `f` to every leaf of `tree`, preserving the mapping structure.
///
/// Sequences count as leaves here; they are handed to `f` whole rather than
/// recursed into.
pub fn map_leaves<F>(tree: &Node, f: &F) -> Node
where
    F: Fn(&Node) -> Node,
{
    match tree {
        Node::Map(m) => Node::Map(
            m.iter()
                .map(|(k, v)| (k.clone(), map_leaves(v, f)))
                .collect(),
        ),
        leaf => f(leaf),
    }
}

/// Collapse every sub-mapping that directly contains `key` down to the value
/// stored under `key`; mappings without it are recursed into, so trees with
/// uneven nesting depths work.
pub fn collapse_key(tree: &Node, key: &str) -> Node {
    match tree {
        Node::Map(m) => match m.get(key) {
            Some(value) => value.clone(),
            None => Node::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), collapse_key(v, key)))
                    .collect(),
            ),
        },
        other => other.clone(),
    }
}

/// Flatten a tree into the ordered list of its leaf strings.
///
/// Mapping values and sequence items are descended depth-first; strings are
/// atomic.
pub fn flatten(tree: &Node) -> Vec<String> {
    let mut out = Vec::new();
    collect_leaves(tree, &mut out);
    out
}

fn collect_leaves(node: &Node, out: &mut Vec<String>) {
    match node {
        Node::Leaf(s) => out.push(s.clone()),
        Node::Seq(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        Node::Map(m) => {
            for value in m.values() {
                collect_leaves(value, out);
            }
        }
    }
}

/// Result of [`flatten_unlist`]: a single bare string when exactly one leaf
/// was found, otherwise the full list.
#[derive(Clone, Debug, PartialEq)]
pub enum Flat {
    One(String),
    Many(Vec<String>),
}

pub fn flatten_unlist(tree: &Node) -> Flat {
    let mut items = flatten(tree);
    if items.len() == 1 {
        Flat::One(items.remove(0))
    } else {
        Flat::Many(items)
    }
}

/// Shallow, key-scoped update of a copy of `orig`.
///
/// With `override_existing` false (the usual mode), keys already present in
/// `orig` keep their value. When `keys` is given, only those keys of
/// `update_with` are considered at all. Contrast with [`deep_merge`], which
/// recurses and always lets the overlay win.
pub fn update_copy<V: Clone>(
    orig: &IndexMap<String, V>,
    update_with: &IndexMap<String, V>,
    keys: Option<&[&str]>,
    override_existing: bool,
) -> IndexMap<String, V> {
    let mut merged = orig.clone();
    let candidates: Vec<&str> = match keys {
        Some(ks) => ks.to_vec(),
        None => update_with.keys().map(String::as_str).collect(),
    };
    for key in candidates {
        if let Some(value) = update_with.get(key) {
            if merged.contains_key(key) && !override_existing {
                continue;
            }
            merged.insert(key.to_string(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Node {
        Node::from_yaml_str(text).unwrap()
    }

    #[test]
    fn test_deep_merge_empty_overlay_is_identity() {
        let base = yaml("a: {b: one, c: two, d: [x, y]}");
        assert_eq!(deep_merge(&base, &Node::empty_map()), base);
    }

    #[test]
    fn test_deep_merge_preserves_sibling_keys() {
        let base = yaml("a: {b: old_b, c: keep_c, d: [x, y]}");
        let overlay = yaml("a: {b: new_b}");
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged, yaml("a: {b: new_b, c: keep_c, d: [x, y]}"));

        let overlay = yaml("a: {d: scalar}");
        let merged = deep_merge(&merged, &overlay);
        assert_eq!(merged, yaml("a: {b: new_b, c: keep_c, d: scalar}"));
    }

    #[test]
    fn test_deep_merge_adds_new_keys_at_depth() {
        let base = yaml("a: {b: x}");
        let overlay = yaml("a: {c: {d: y}}\ne: z");
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged, yaml("a: {b: x, c: {d: y}}\ne: z"));
    }

    #[test]
    fn test_deep_merge_does_not_mutate_inputs() {
        let base = yaml("a: {b: x}");
        let overlay = yaml("a: {b: y}");
        let _ = deep_merge(&base, &overlay);
        assert_eq!(base, yaml("a: {b: x}"));
        assert_eq!(overlay, yaml("a: {b: y}"));
    }

    #[test]
    fn test_map_leaves_applies_to_seq_leaves() {
        let tree = yaml("a: {b: one}\nc: [two, three]");
        let upper = map_leaves(&tree, &|leaf| match leaf {
            Node::Leaf(s) => Node::Leaf(s.to_uppercase()),
            other => Node::Leaf(format!("{}-item-seq", flatten(other).len())),
        });
        assert_eq!(upper, yaml("a: {b: ONE}\nc: 2-item-seq"));
    }

    #[test]
    fn test_collapse_key() {
        let tree = yaml("a: {b: {target: one, ignore: two}}\nc: {target: three}");
        let collapsed = collapse_key(&tree, "target");
        assert_eq!(collapsed, yaml("a: {b: one}\nc: three"));
    }

    #[test]
    fn test_collapse_key_leaves_plain_leaves_alone() {
        let tree = yaml("a: plain\nb: {target: t}");
        assert_eq!(collapse_key(&tree, "target"), yaml("a: plain\nb: t"));
    }

    #[test]
    fn test_flatten_orders_depth_first() {
        let tree = yaml("a: {b: {c: [a1, b1, c1]}}\nx: [e1, f1]\ny: {z: d1}");
        assert_eq!(flatten(&tree), vec!["a1", "b1", "c1", "e1", "f1", "d1"]);
    }

    #[test]
    fn test_flatten_extra_nesting_is_transparent() {
        let inner = yaml("x: [e1, f1]");
        let wrapped = yaml("outer: {x: [e1, f1]}");
        assert_eq!(flatten(&inner), flatten(&wrapped));
    }

    #[test]
    fn test_flatten_unlist() {
        assert_eq!(
            flatten_unlist(&Node::leaf("a")),
            Flat::One("a".to_string())
        );
        assert_eq!(
            flatten_unlist(&yaml("[a]")),
            Flat::One("a".to_string())
        );
        assert_eq!(
            flatten_unlist(&yaml("[a, b]")),
            Flat::Many(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_json_serialization_keeps_tree_shape() {
        let tree = yaml("a: {b: [one, two]}\nc: three");
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"a":{"b":["one","two"]},"c":"three"}"#);
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_update_copy_first_write_wins() {
        let orig: IndexMap<String, u32> = IndexMap::from([("a".to_string(), 1)]);
        let update: IndexMap<String, u32> =
            IndexMap::from([("a".to_string(), 2), ("b".to_string(), 3)]);

        let kept = update_copy(&orig, &update, None, false);
        assert_eq!(kept.get("a"), Some(&1));
        assert_eq!(kept.get("b"), Some(&3));

        let overridden = update_copy(&orig, &update, None, true);
        assert_eq!(overridden.get("a"), Some(&2));
        assert_eq!(overridden.get("b"), Some(&3));
    }

    #[test]
    fn test_update_copy_key_scoping() {
        let orig: IndexMap<String, u32> = IndexMap::new();
        let update: IndexMap<String, u32> =
            IndexMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        let scoped = update_copy(&orig, &update, Some(&["b", "absent"]), false);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped.get("b"), Some(&2));
    }
}
