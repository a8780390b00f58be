//! Cluster ordering.
//!
//! For a fixed dimension order, a second best-first search: each tree level's
//! children are candidate permutations of the next axis's clusters, scored by
//! the exact crossing count of the row-weighted connections to the previous
//! axis. Axis 0 always holds the single boundary dummy, so the root is the
//! one-element identity permutation.

use crate::cross_count::cross_count;
use crate::search::{Frontier, NodeId, SearchTree, compare_costs_min1};
use crate::util::{limited_permutations, rearrange};
use kelp_clusters::{Cluster, ClusterKind, PlotData};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error};

/// Permutation spaces beyond this size fall back to the size-sort heuristic.
pub const PERMUTATION_LIMIT: usize = 10_000_000;

/// Crossing cost of one adjacent axis pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisCost {
    pub label: String,
    pub cost: f64,
}

/// Accumulated and per-axis costs of a solved cluster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterOrderCosts {
    pub total: f64,
    pub per_axis: Vec<AxisCost>,
}

impl ClusterOrderCosts {
    fn empty() -> Self {
        Self {
            total: 0.0,
            per_axis: Vec::new(),
        }
    }
}

impl fmt::Display for ClusterOrderCosts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{json}")
    }
}

#[derive(Debug, Clone)]
struct Solved<'a> {
    clusters: Vec<Vec<&'a Cluster>>,
    indices: Vec<Vec<usize>>,
    costs: ClusterOrderCosts,
}

/// Solves the per-axis cluster ordering for one plot and dimension order.
///
/// The result is computed once per instance; re-solving with different inputs
/// requires a new instance.
pub struct ClusterOrder<'a> {
    data: &'a PlotData,
    dim_order: Vec<String>,
    try_permutation: bool,
    override_order: Option<Vec<Vec<usize>>>,
    solved: Option<Solved<'a>>,
}

impl<'a> ClusterOrder<'a> {
    pub fn new(data: &'a PlotData, dim_order: Vec<String>) -> Self {
        Self {
            data,
            dim_order,
            try_permutation: true,
            override_order: None,
            solved: None,
        }
    }

    pub fn dim_order(&self) -> &[String] {
        &self.dim_order
    }

    /// Disables or re-enables exhaustive permutation search; with it off every
    /// axis takes the size-sort heuristic path. Takes effect on the first
    /// solve; the result is computed once per instance.
    pub fn set_try_permutation(&mut self, enabled: bool) {
        self.try_permutation = enabled;
    }

    /// Installs externally supplied per-axis index permutations, bypassing the
    /// search entirely. Axes beyond the override's length keep their raw order.
    /// Takes effect on the first solve; the result is computed once per
    /// instance.
    pub fn set_override(&mut self, order: Vec<Vec<usize>>) {
        self.override_order = Some(order);
    }

    /// One cluster list per axis in dimension order, each a permutation of that
    /// axis's raw cluster list. Computed once; later calls return a fresh copy.
    pub fn cluster_order(&mut self) -> Vec<Vec<&'a Cluster>> {
        self.ensure_solved();
        self.solved
            .as_ref()
            .map(|solved| solved.clusters.clone())
            .unwrap_or_default()
    }

    /// The index permutation applied to each axis's raw cluster list.
    pub fn order_indices(&mut self) -> Vec<Vec<usize>> {
        self.ensure_solved();
        self.solved
            .as_ref()
            .map(|solved| solved.indices.clone())
            .unwrap_or_default()
    }

    /// Total and per-axis crossing costs of the solved order.
    pub fn costs(&mut self) -> ClusterOrderCosts {
        self.ensure_solved();
        self.solved
            .as_ref()
            .map(|solved| solved.costs.clone())
            .unwrap_or_else(ClusterOrderCosts::empty)
    }

    fn ensure_solved(&mut self) {
        if self.solved.is_none() {
            self.solved = Some(self.solve());
        }
    }

    /// The raw (unsorted) cluster list per axis: the reflexive list for axis 0,
    /// then one transition list per adjacent dimension pair.
    fn unsorted_clusters(&self) -> Vec<&'a [Cluster]> {
        let mut unsorted = Vec::with_capacity(self.dim_order.len());
        if self.dim_order.is_empty() {
            return unsorted;
        }
        unsorted.push(
            self.data
                .clusters_between(&self.dim_order[0], &self.dim_order[0]),
        );
        for pair in self.dim_order.windows(2) {
            unsorted.push(self.data.clusters_between(&pair[0], &pair[1]));
        }
        unsorted
    }

    fn solve(&self) -> Solved<'a> {
        if self.dim_order.is_empty() {
            return Solved {
                clusters: Vec::new(),
                indices: Vec::new(),
                costs: ClusterOrderCosts::empty(),
            };
        }

        let unsorted = self.unsorted_clusters();
        if let Some(order) = &self.override_order {
            return self.apply_override(&unsorted, order);
        }

        let start = Instant::now();
        let mut tree: SearchTree<Vec<usize>> = SearchTree::new(vec![0]);
        let mut frontier: Frontier<Vec<usize>> = Frontier::new(compare_costs_min1);

        let mut current = tree.root();
        while tree.node(current).level < self.dim_order.len() - 1 {
            self.expand(&mut tree, &mut frontier, &unsorted, current);
            current = match frontier.pop(&tree) {
                Some(id) => id,
                None => break,
            };
        }

        let total = tree.node(current).accumulated_cost;
        let axis_count = self.dim_order.len();
        let mut clusters: Vec<Vec<&'a Cluster>> = vec![Vec::new(); axis_count];
        let mut indices: Vec<Vec<usize>> = vec![Vec::new(); axis_count];
        let mut per_axis = vec![
            AxisCost {
                label: String::new(),
                cost: 0.0,
            };
            axis_count - 1
        ];

        let mut walker = Some(current);
        for axis in (0..axis_count).rev() {
            let Some(id) = walker else { break };
            let node = tree.node(id);
            indices[axis] = node.value.clone();
            clusters[axis] = node.value.iter().map(|&c| &unsorted[axis][c]).collect();
            if axis > 0 {
                per_axis[axis - 1] = AxisCost {
                    label: format!("{}-{}", self.dim_order[axis - 1], self.dim_order[axis]),
                    cost: node.cost,
                };
            }
            walker = node.parent;
        }

        let costs = ClusterOrderCosts { total, per_axis };
        debug!(
            %costs,
            nodes = tree.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "cluster order solved"
        );
        Solved {
            clusters,
            indices,
            costs,
        }
    }

    fn expand(
        &self,
        tree: &mut SearchTree<Vec<usize>>,
        frontier: &mut Frontier<Vec<usize>>,
        unsorted: &[&'a [Cluster]],
        node: NodeId,
    ) {
        let level = tree.node(node).level;
        let current_unsorted = unsorted[level];
        let current_clusters: Vec<&Cluster> = tree
            .node(node)
            .value
            .iter()
            .map(|&c| &current_unsorted[c])
            .collect();
        let next_unsorted = unsorted[level + 1];

        let identity: Vec<usize> = (0..next_unsorted.len()).collect();
        let permutations = if self.try_permutation {
            limited_permutations(&identity, PERMUTATION_LIMIT)
        } else {
            None
        };
        let permutations = match permutations {
            Some(found) => found,
            None => {
                // too many permutations: biggest first, noise last
                let mut order = identity;
                sort_by_cluster_size(&mut order, next_unsorted);
                vec![order]
            }
        };

        for (source_index, order) in permutations.into_iter().enumerate() {
            let next_clusters: Vec<&Cluster> = order.iter().map(|&c| &next_unsorted[c]).collect();
            let connections = connection_matrix(self.data, &current_clusters, &next_clusters);
            // +1 keeps every step at or above the comparator's assumed minimum
            let cost = cross_count(&connections) + 1.0;
            let child = tree.add_child(node, order, source_index, cost);
            frontier.push(tree, child);
        }
    }

    fn apply_override(&self, unsorted: &[&'a [Cluster]], order: &[Vec<usize>]) -> Solved<'a> {
        let mut clusters = Vec::with_capacity(unsorted.len());
        let mut indices = Vec::with_capacity(unsorted.len());

        for (axis, raw) in unsorted.iter().enumerate() {
            let refs: Vec<&'a Cluster> = raw.iter().collect();
            match order.get(axis) {
                Some(axis_order) => match rearrange(&refs, axis_order) {
                    Ok(arranged) => {
                        indices.push(axis_order.clone());
                        clusters.push(arranged);
                    }
                    Err(err) => {
                        error!(axis, %err, "discarding cluster order override");
                        return Solved {
                            clusters: Vec::new(),
                            indices: Vec::new(),
                            costs: ClusterOrderCosts::empty(),
                        };
                    }
                },
                None => {
                    indices.push((0..refs.len()).collect());
                    clusters.push(refs);
                }
            }
        }

        Solved {
            clusters,
            indices,
            costs: ClusterOrderCosts::empty(),
        }
    }
}

/// Orders cluster indices by descending size, moving the noise cluster (if
/// present) to the last position.
pub fn sort_by_cluster_size(order: &mut Vec<usize>, clusters: &[Cluster]) {
    order.sort_by(|&a, &b| clusters[b].size().cmp(&clusters[a].size()));

    if let Some(noise) = clusters
        .iter()
        .position(|c| c.kind() == ClusterKind::Noise)
    {
        if let Some(at) = order.iter().position(|&index| index == noise) {
            if at < order.len() - 1 {
                let index = order.remove(at);
                order.push(index);
            }
        }
    }
}

/// Builds the `connections[to][from]` matrix of row-weighted transitions
/// between two ordered cluster lists: each row contributes the product of its
/// fuzzy weights in the `from` and `to` clusters.
pub fn connection_matrix(data: &PlotData, from: &[&Cluster], to: &[&Cluster]) -> Vec<Vec<f64>> {
    let mut connections = vec![vec![0.0; from.len()]; to.len()];
    for row in data.rows() {
        for (f, from_cluster) in from.iter().enumerate() {
            let from_weight = from_cluster.weight_of(row);
            if from_weight == 0.0 {
                continue;
            }
            for (t, to_cluster) in to.iter().enumerate() {
                connections[t][f] += from_weight * to_cluster.weight_of(row);
            }
        }
    }
    connections
}
