//! Feature taxonomy as a tree, built from the flat `parent_id` list.

use std::collections::{BTreeMap, HashSet};

use curation_api::types::{Feature, FeatureID};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureNode {
    pub feature: Feature,
    pub children: Vec<FeatureNode>,
}

impl FeatureNode {
    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(FeatureNode::size).sum::<usize>()
    }
}

/// Builds root-first trees, children ordered by name.
///
/// A feature whose parent is missing from `features` (filtered out, or on
/// another page) becomes a root. Cycles are broken at the first revisited node.
pub fn build_tree(features: &[Feature]) -> Vec<FeatureNode> {
    let known: HashSet<FeatureID> = features.iter().map(|f| f.id).collect();
    let mut children: BTreeMap<FeatureID, Vec<&Feature>> = BTreeMap::new();
    let mut roots: Vec<&Feature> = Vec::new();

    for feature in features {
        match feature.parent_id {
            Some(parent) if parent != feature.id && known.contains(&parent) => {
                children.entry(parent).or_default().push(feature)
            }
            _ => roots.push(feature),
        }
    }

    let mut visited = HashSet::new();
    let mut trees: Vec<FeatureNode> = sorted(roots)
        .into_iter()
        .map(|root| attach(root, &children, &mut visited))
        .collect();

    // Members of a parent cycle are unreachable from any root.
    let orphans: Vec<&Feature> = features
        .iter()
        .filter(|f| !visited.contains(&f.id))
        .collect();
    for feature in sorted(orphans) {
        if !visited.contains(&feature.id) {
            tracing::warn!("Feature {} is part of a parent cycle", feature.id);
            trees.push(attach(feature, &children, &mut visited));
        }
    }
    trees
}

fn attach(
    feature: &Feature,
    children: &BTreeMap<FeatureID, Vec<&Feature>>,
    visited: &mut HashSet<FeatureID>,
) -> FeatureNode {
    visited.insert(feature.id);
    let kids = children.get(&feature.id).cloned().unwrap_or_default();
    let pending: Vec<&Feature> = sorted(kids)
        .into_iter()
        .filter(|child| !visited.contains(&child.id))
        .collect();
    FeatureNode {
        feature: feature.clone(),
        children: pending
            .into_iter()
            .map(|child| attach(child, children, visited))
            .collect(),
    }
}

fn sorted(mut features: Vec<&Feature>) -> Vec<&Feature> {
    features.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    features
}

/// Renders trees as indented lines, two spaces per level.
pub fn render(trees: &[FeatureNode]) -> Vec<String> {
    fn walk(node: &FeatureNode, depth: usize, out: &mut Vec<String>) {
        out.push(format!(
            "{}{} [{}] ({})",
            "  ".repeat(depth),
            node.feature.name,
            node.feature.category,
            node.feature.id
        ));
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    for tree in trees {
        walk(tree, 0, &mut out);
    }
    out
}
