// src/tree.rs

use std::fmt::Write as FmtWrite;

use ahash::AHashMap;

use crate::format::{format_number, NO_VALUE};
use crate::metrics::MetricRegistry;
use crate::types::{MetricValues, TaxLevel, TaxonRow};

/// Tree construction knobs. `collapse_threshold` is the number of
/// children a node may show before the rest fold into an "other" node;
/// `sort_metric` decides which children are lowest-ranked.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub collapse_threshold: usize,
    pub sort_metric: String,
}

impl TreeConfig {
    pub fn new(collapse_threshold: usize, sort_metric: &str) -> Self {
        TreeConfig {
            collapse_threshold,
            sort_metric: sort_metric.to_string(),
        }
    }
}

/// One node of the built tree. Relations are arena indices, never
/// pointers, so the structure stays acyclic and auditable.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub tax_id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub lineage_rank: TaxLevel,
    pub parent: Option<usize>,
    /// Visible children, ordered by the sort metric descending.
    pub children: Vec<usize>,
    /// Aggregated metric values, finalized during construction.
    pub values: MetricValues,
    /// True for synthetic "other" nodes standing in for collapsed siblings.
    pub is_aggregated: bool,
    /// For synthetic nodes: the collapsed members, for tooltip display only.
    /// Members are never navigable through `children`.
    pub collapsed_members: Vec<usize>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Per-node metric snapshot for the hover tooltip. Values come from the
/// node's finalized aggregates; construction completes before any
/// snapshot can be taken, so partial sums are unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipSnapshot {
    /// (label, formatted value) pairs in registry display order.
    pub metrics: Vec<(String, String)>,
    /// For synthetic nodes, how many siblings were folded in.
    pub member_count: Option<usize>,
}

/// The taxon tree built from a flat report: an arena of nodes plus the
/// root set. Rebuilt from scratch on every report fetch.
#[derive(Debug, Clone)]
pub struct TaxonTree {
    nodes: Vec<TreeNode>,
    roots: Vec<usize>,
}

impl TaxonTree {
    pub fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node index by tax id. Synthetic nodes have no tax id of
    /// their own and are never returned here.
    pub fn find(&self, tax_id: i64) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| !n.is_aggregated && n.tax_id == tax_id)
    }

    /// Tooltip data for any node, aggregated or not.
    pub fn tooltip_snapshot(&self, idx: usize, registry: &MetricRegistry) -> TooltipSnapshot {
        let node = &self.nodes[idx];
        let metrics = registry
            .specs()
            .iter()
            .map(|spec| {
                let value = match node.value(&spec.key) {
                    Some(v) => format_number(v, spec.decimal_places),
                    None => NO_VALUE.to_string(),
                };
                (spec.label.clone(), value)
            })
            .collect();
        let member_count = node
            .is_aggregated
            .then_some(node.collapsed_members.len());
        TooltipSnapshot {
            metrics,
            member_count,
        }
    }

    /// Render the visible tree as an indented text report, one node per
    /// line, siblings ordered by `metric` descending.
    pub fn render_text(&self, registry: &MetricRegistry, metric: &str) -> String {
        let decimal_places = registry.get(metric).map(|s| s.decimal_places).unwrap_or(0);
        let mut output = String::new();
        output.push_str("value\ttaxID\trank\tname\n");

        let mut roots = self.roots.clone();
        self.sort_by_metric_desc(&mut roots, metric);

        // Pre-order DFS over visible children only.
        let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            let value = match node.value(metric) {
                Some(v) => format_number(v, decimal_places),
                None => NO_VALUE.to_string(),
            };

            let mut indented_name = String::new();
            for _ in 0..depth {
                indented_name.push('\t');
            }
            indented_name.push_str(&node.scientific_name);

            let _ = writeln!(
                output,
                "{}\t{}\t{}\t{}",
                value,
                node.tax_id,
                node.lineage_rank.as_str(),
                indented_name
            );

            let mut kids = node.children.clone();
            self.sort_by_metric_desc(&mut kids, metric);
            for &child in kids.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        output
    }

    fn sort_by_metric_desc(&self, indices: &mut [usize], metric: &str) {
        indices.sort_by(|&a, &b| {
            let va = self.nodes[a].value(metric).unwrap_or(0.0);
            let vb = self.nodes[b].value(metric).unwrap_or(0.0);
            vb.partial_cmp(&va).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Build the taxon tree from a flat report.
///
/// Two explicit passes: (1) index rows by tax id and link parent/child
/// adjacency, (2) iterative post-order aggregation so every parent is
/// finalized strictly after its children. A third pass folds low-value
/// siblings into synthetic "other" nodes.
pub fn build_taxon_tree(
    rows: &[TaxonRow],
    registry: &MetricRegistry,
    config: &TreeConfig,
) -> TaxonTree {
    // Pass 1: arena + index.
    let mut nodes: Vec<TreeNode> = rows
        .iter()
        .map(|row| TreeNode {
            tax_id: row.tax_id,
            scientific_name: row.scientific_name.clone(),
            common_name: row.common_name.clone(),
            lineage_rank: row.tax_level,
            parent: None,
            children: Vec::new(),
            values: row.values.clone(),
            is_aggregated: false,
            collapsed_members: Vec::new(),
        })
        .collect();

    let mut index: AHashMap<i64, usize> = AHashMap::new();
    for (i, row) in rows.iter().enumerate() {
        index.insert(row.tax_id, i);
    }

    let mut roots: Vec<usize> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row.parent_tax_id <= 0 || row.parent_tax_id == row.tax_id {
            roots.push(i);
            continue;
        }
        match index.get(&row.parent_tax_id) {
            Some(&parent_idx) => {
                nodes[i].parent = Some(parent_idx);
                nodes[parent_idx].children.push(i);
            }
            None => {
                // Recovered condition: render the orphan as a root
                // rather than dropping it.
                log::warn!(
                    "taxon {} has unknown parent {}; promoting to root",
                    row.tax_id,
                    row.parent_tax_id
                );
                roots.push(i);
            }
        }
    }

    // Pass 2: iterative post-order. Children are always finalized
    // before their parent's aggregates are computed.
    let mut stack: Vec<(usize, bool)> = roots.iter().map(|&r| (r, false)).collect();
    let mut child_values: Vec<f64> = Vec::new();
    while let Some((idx, expanded)) = stack.pop() {
        if !expanded {
            stack.push((idx, true));
            for c in 0..nodes[idx].children.len() {
                let child = nodes[idx].children[c];
                stack.push((child, false));
            }
            continue;
        }
        if nodes[idx].children.is_empty() {
            // Leaves keep their raw values untouched.
            continue;
        }
        for spec in registry.specs() {
            child_values.clear();
            for c in 0..nodes[idx].children.len() {
                let child = nodes[idx].children[c];
                if let Some(v) = nodes[child].value(&spec.key) {
                    child_values.push(v);
                }
            }
            if let Some(combined) = spec.combinator.combine(&child_values) {
                nodes[idx].values.insert(spec.key.clone(), combined);
            }
            // No child carries the metric: the node's own raw value,
            // if any, stands.
        }
    }

    // Pass 3: collapse. Only the original nodes are candidates; the
    // synthetic nodes appended here never have children of their own.
    let original_len = nodes.len();
    for idx in 0..original_len {
        if nodes[idx].children.len() <= config.collapse_threshold {
            continue;
        }
        let mut kids = nodes[idx].children.clone();
        kids.sort_by(|&a, &b| {
            let va = nodes[a].value(&config.sort_metric).unwrap_or(0.0);
            let vb = nodes[b].value(&config.sort_metric).unwrap_or(0.0);
            vb.partial_cmp(&va).unwrap_or(std::cmp::Ordering::Equal)
        });

        let kept: Vec<usize> = kids[..config.collapse_threshold].to_vec();
        let collapsed: Vec<usize> = kids[config.collapse_threshold..].to_vec();

        let mut other_values = MetricValues::new();
        let mut member_values: Vec<f64> = Vec::new();
        for spec in registry.specs() {
            member_values.clear();
            for &member in &collapsed {
                if let Some(v) = nodes[member].value(&spec.key) {
                    member_values.push(v);
                }
            }
            if let Some(combined) = spec.combinator.combine(&member_values) {
                other_values.insert(spec.key.clone(), combined);
            }
        }

        let other = TreeNode {
            tax_id: -1,
            scientific_name: format!("({})", collapsed.len()),
            common_name: None,
            lineage_rank: nodes[collapsed[0]].lineage_rank,
            parent: Some(idx),
            children: Vec::new(),
            values: other_values,
            is_aggregated: true,
            collapsed_members: collapsed,
        };
        let other_idx = nodes.len();
        nodes.push(other);

        let mut children = kept;
        children.push(other_idx);
        nodes[idx].children = children;
    }

    TaxonTree { nodes, roots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowType;

    fn registry() -> MetricRegistry {
        MetricRegistry::for_workflow(WorkflowType::ShortReadMngs)
    }

    fn config() -> TreeConfig {
        TreeConfig::new(10, "nt_r")
    }

    fn species(tax_id: i64, parent: i64, name: &str, nt_r: f64, score: f64) -> TaxonRow {
        TaxonRow::new(tax_id, parent, name, TaxLevel::Species)
            .with_value("nt_r", nt_r)
            .with_value("aggregatescore", score)
    }

    fn sample_rows() -> Vec<TaxonRow> {
        vec![
            TaxonRow::new(561, 543, "Escherichia", TaxLevel::Genus),
            species(562, 561, "Escherichia coli", 100.0, 250.0),
            species(564, 561, "Escherichia fergusonii", 40.0, 90.0),
            TaxonRow::new(543, 0, "Enterobacteriaceae", TaxLevel::Higher),
            TaxonRow::new(590, 543, "Salmonella", TaxLevel::Genus),
            species(28901, 590, "Salmonella enterica", 60.0, 310.0),
        ]
    }

    fn child_sum(tree: &TaxonTree, idx: usize, metric: &str) -> f64 {
        tree.node(idx)
            .children
            .iter()
            .map(|&c| tree.node(c).value(metric).unwrap_or(0.0))
            .sum()
    }

    #[test]
    fn summed_metrics_aggregate_bottom_up() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &config());

        let genus = tree.find(561).unwrap();
        assert_eq!(tree.node(genus).value("nt_r"), Some(140.0));

        // Grandparent sees the grandchildren through its children.
        let family = tree.find(543).unwrap();
        assert_eq!(tree.node(family).value("nt_r"), Some(200.0));
        assert_eq!(tree.node(family).value("nt_r").unwrap(), child_sum(&tree, family, "nt_r"));
    }

    #[test]
    fn max_combined_metrics_take_the_best_descendant() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &config());
        let family = tree.find(543).unwrap();
        assert_eq!(tree.node(family).value("aggregatescore"), Some(310.0));
    }

    #[test]
    fn leaves_keep_their_raw_values() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &config());
        let leaf = tree.find(562).unwrap();
        assert!(tree.node(leaf).is_leaf());
        assert_eq!(tree.node(leaf).value("nt_r"), Some(100.0));
    }

    #[test]
    fn orphans_become_roots() {
        let mut rows = sample_rows();
        rows.push(species(1280, 1279, "Staphylococcus aureus", 5.0, 10.0));

        let tree = build_taxon_tree(&rows, &registry(), &config());
        let orphan = tree.find(1280).unwrap();
        assert!(tree.roots().contains(&orphan));
        assert!(tree.node(orphan).parent.is_none());
    }

    #[test]
    fn collapse_folds_lowest_children_into_other() {
        let mut rows = vec![TaxonRow::new(561, 0, "Escherichia", TaxLevel::Genus)];
        for i in 0..5 {
            rows.push(species(600 + i, 561, &format!("species {i}"), (i + 1) as f64 * 10.0, 0.0));
        }

        let cfg = TreeConfig::new(2, "nt_r");
        let tree = build_taxon_tree(&rows, &registry(), &cfg);
        let genus = tree.find(561).unwrap();
        let children = &tree.node(genus).children;

        // threshold T=2 with N=5: exactly 2 explicit children + 1 synthetic.
        assert_eq!(children.len(), 3);
        let other_idx = *children.last().unwrap();
        let other = tree.node(other_idx);
        assert!(other.is_aggregated);
        assert_eq!(other.collapsed_members.len(), 3);

        // Kept children are the highest by the sort metric.
        assert_eq!(tree.node(children[0]).value("nt_r"), Some(50.0));
        assert_eq!(tree.node(children[1]).value("nt_r"), Some(40.0));

        // The synthetic node carries the combinator result over its
        // members, so the parent-equals-children invariant still holds.
        assert_eq!(other.value("nt_r"), Some(10.0 + 20.0 + 30.0));
        assert_eq!(
            tree.node(genus).value("nt_r").unwrap(),
            child_sum(&tree, genus, "nt_r")
        );
    }

    #[test]
    fn collapsed_members_are_not_navigable() {
        let mut rows = vec![TaxonRow::new(561, 0, "Escherichia", TaxLevel::Genus)];
        for i in 0..4 {
            rows.push(species(600 + i, 561, &format!("species {i}"), (i + 1) as f64, 0.0));
        }
        let cfg = TreeConfig::new(1, "nt_r");
        let tree = build_taxon_tree(&rows, &registry(), &cfg);
        let genus = tree.find(561).unwrap();
        let other_idx = *tree.node(genus).children.last().unwrap();

        for &member in &tree.node(other_idx).collapsed_members {
            assert!(!tree.node(genus).children.contains(&member));
        }
    }

    #[test]
    fn no_collapse_at_or_below_threshold() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &TreeConfig::new(2, "nt_r"));
        let genus = tree.find(561).unwrap();
        assert_eq!(tree.node(genus).children.len(), 2);
        assert!(tree
            .node(genus)
            .children
            .iter()
            .all(|&c| !tree.node(c).is_aggregated));
    }

    #[test]
    fn tooltip_reflects_finalized_values() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &config());
        let genus = tree.find(561).unwrap();
        let snapshot = tree.tooltip_snapshot(genus, &registry());

        assert_eq!(snapshot.member_count, None);
        let nt_r = snapshot
            .metrics
            .iter()
            .find(|(label, _)| label == "NT r")
            .unwrap();
        assert_eq!(nt_r.1, "140");
        // Max-combined metric: the genus inherits its best species.
        let score = snapshot
            .metrics
            .iter()
            .find(|(label, _)| label == "Aggregate Score")
            .unwrap();
        assert_eq!(score.1, "250");
    }

    #[test]
    fn tooltip_for_synthetic_node_reports_member_count() {
        let mut rows = vec![TaxonRow::new(561, 0, "Escherichia", TaxLevel::Genus)];
        for i in 0..4 {
            rows.push(species(600 + i, 561, &format!("species {i}"), (i + 1) as f64, 0.0));
        }
        let tree = build_taxon_tree(&rows, &registry(), &TreeConfig::new(1, "nt_r"));
        let genus = tree.find(561).unwrap();
        let other_idx = *tree.node(genus).children.last().unwrap();

        let snapshot = tree.tooltip_snapshot(other_idx, &registry());
        assert_eq!(snapshot.member_count, Some(3));
    }

    #[test]
    fn render_text_orders_siblings_by_metric_desc() {
        let tree = build_taxon_tree(&sample_rows(), &registry(), &config());
        let text = tree.render_text(&registry(), "nt_r");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "value\ttaxID\trank\tname");
        assert!(lines[1].contains("Enterobacteriaceae"));
        // Escherichia (140) before Salmonella (60).
        let esch = lines.iter().position(|l| l.ends_with("Escherichia")).unwrap();
        let salm = lines.iter().position(|l| l.ends_with("Salmonella")).unwrap();
        assert!(esch < salm);
    }
}
