//! Dimension ordering.
//!
//! Best-first search over simple paths through all dimensions. A step's cost
//! depends on up to the last two choices: the triple cache keys it by
//! grandparent/parent/child once the path is deep enough, the pair cache below
//! that. Both caches fill lazily from the cluster-based distance formula.

use crate::cache::{PairCache, PairWeight, TripleCache, TripleWeight};
use crate::search::{Frontier, NodeId, SearchTree, compare_costs_min1};
use kelp_clusters::{Cluster, PlotData};
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::debug;

/// Jaccard-style distance between two clusters' row memberships: 0 when the
/// memberships are identical, 1 when they are disjoint.
pub fn cluster_distance(left: &Cluster, right: &Cluster) -> f64 {
    let (small, large) = if left.size() <= right.size() {
        (left, right)
    } else {
        (right, left)
    };
    let intersection = small.rows().filter(|&row| large.contains(row)).count();
    let union = left.size() + right.size() - intersection;
    1.0 - intersection as f64 / union as f64
}

/// Dissimilarity between two dimensions' cluster lists.
///
/// A large spread of the pairwise cluster distances around their mean means the
/// cluster pairs are either very similar or very dissimilar, which reads as a
/// strong structural match; uniformly mediocre distances read as a poor match.
/// The spread is inverted onto `(1, 2]` so every search step costs at least 1.
pub fn dim_distance(left: &[Cluster], right: &[Cluster]) -> f64 {
    let mut distances = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            distances.push(cluster_distance(l, r));
        }
    }

    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    let sum_sq = distances.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>();

    1.0 / (sum_sq + 1.0) + 1.0
}

/// Weight strategy over the plot data's cluster lists, shared by the pair and
/// triple caches.
struct DimWeight<'a> {
    data: &'a PlotData,
}

impl DimWeight<'_> {
    fn pair(&self, dim1: usize, dim2: usize) -> f64 {
        let names = self.data.dim_names();
        let left = self.data.clusters_between(&names[dim1], &names[dim1]);
        let right = self.data.clusters_between(&names[dim1], &names[dim2]);
        dim_distance(left, right)
    }
}

impl PairWeight for DimWeight<'_> {
    fn weight(&self, dim1: usize, dim2: usize) -> f64 {
        self.pair(dim1, dim2)
    }
}

impl TripleWeight for DimWeight<'_> {
    fn weight(&self, dim1: usize, dim2: usize, dim3: usize) -> f64 {
        let names = self.data.dim_names();
        let left = self.data.clusters_between(&names[dim1], &names[dim2]);
        let right = self.data.clusters_between(&names[dim2], &names[dim3]);
        dim_distance(left, right)
    }
}

/// Solves the dimension ordering for one plot.
///
/// The result is computed once per instance; re-solving with different data
/// requires a new instance.
pub struct AxisOrder<'a> {
    data: &'a PlotData,
    max_dims: Option<usize>,
    pair_costs: Option<PairCache<DimWeight<'a>>>,
    triple_costs: Option<TripleCache<DimWeight<'a>>>,
    dim_order: Option<Vec<String>>,
}

impl<'a> AxisOrder<'a> {
    pub fn new(data: &'a PlotData) -> Self {
        Self::with_max_dims(data, None)
    }

    /// Caps the search at the first `max_dims` positions of the ordering.
    pub fn with_max_dims(data: &'a PlotData, max_dims: Option<usize>) -> Self {
        let dim_count = data.dim_count();
        Self {
            data,
            max_dims,
            pair_costs: PairCache::lazy(dim_count, DimWeight { data }).ok(),
            triple_costs: TripleCache::lazy(dim_count, DimWeight { data }).ok(),
            dim_order: None,
        }
    }

    /// The solved dimension order. Computed once; later calls return a fresh
    /// copy.
    pub fn dim_order(&mut self) -> Vec<String> {
        if let Some(order) = &self.dim_order {
            return order.clone();
        }
        let order = self.solve();
        self.dim_order = Some(order.clone());
        order
    }

    /// Installs an externally supplied order, bypassing the solver.
    pub fn set_dim_order(&mut self, order: Vec<String>) {
        self.dim_order = Some(order);
    }

    fn solve(&mut self) -> Vec<String> {
        let start = Instant::now();
        let dim_names: Vec<String> = self.data.dim_names().to_vec();

        let mut tree: SearchTree<String> = SearchTree::new(String::new());
        let mut frontier: Frontier<String> = Frontier::new(compare_costs_min1);

        let root = tree.root();
        for (index, dim) in dim_names.iter().enumerate() {
            let child = tree.add_child(root, dim.clone(), index, 0.0);
            frontier.push(&tree, child);
        }

        let mut end = dim_names.len();
        if let Some(max) = self.max_dims {
            if max > 0 && max < end {
                end = max;
            }
        }

        let mut current = match frontier.pop(&tree) {
            Some(id) => id,
            None => return Vec::new(),
        };
        while tree.node(current).level < end {
            self.expand(&mut tree, &mut frontier, &dim_names, current);
            current = match frontier.pop(&tree) {
                Some(id) => id,
                None => break,
            };
        }

        let mut order = vec![String::new(); end];
        let mut walker = Some(current);
        for slot in order.iter_mut().rev() {
            let Some(id) = walker else { break };
            *slot = tree.node(id).value.clone();
            walker = tree.node(id).parent;
        }

        debug!(
            ?order,
            nodes = tree.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "axis order solved"
        );
        order
    }

    fn expand(
        &mut self,
        tree: &mut SearchTree<String>,
        frontier: &mut Frontier<String>,
        dim_names: &[String],
        node: NodeId,
    ) {
        // dimensions already used anywhere on this path
        let mut used: FxHashSet<usize> = FxHashSet::default();
        let mut walker = Some(node);
        while let Some(id) = walker {
            let ancestor = tree.node(id);
            if ancestor.level > 0 {
                used.insert(ancestor.source_index);
            }
            walker = ancestor.parent;
        }

        let parent_source = tree.node(node).source_index;
        let grandparent_source = tree.node(node).parent.map(|id| tree.node(id).source_index);
        let child_level = tree.node(node).level + 1;

        for (source_index, dim) in dim_names.iter().enumerate() {
            if used.contains(&source_index) {
                continue;
            }
            let cost = self.step_cost(child_level, grandparent_source, parent_source, source_index);
            let child = tree.add_child(node, dim.clone(), source_index, cost);
            frontier.push(tree, child);
        }
    }

    fn step_cost(
        &mut self,
        child_level: usize,
        grandparent: Option<usize>,
        parent: usize,
        child: usize,
    ) -> f64 {
        if child_level >= 3 {
            if let (Some(costs), Some(grand)) = (self.triple_costs.as_mut(), grandparent) {
                return costs.get(grand, parent, child);
            }
        }
        if child_level >= 2 {
            if let Some(costs) = self.pair_costs.as_mut() {
                return costs.get(parent, child);
            }
        }
        DimWeight { data: self.data }.pair(parent, child)
    }
}
