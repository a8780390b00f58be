//! Cluster and row data structures consumed by `kelp`.
//!
//! Clusters are produced by an external fuzzy-clustering step and read here
//! without ever being mutated. [`PlotData`] is the hand-off point: the ordered
//! dimension names, the row count, and the clusters computed between each
//! dimension pair.

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Stable row identifier; rows are numbered `0..row_count` in input order.
pub type RowId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterKind {
    #[default]
    Regular,
    Noise,
    Dummy,
}

/// Per-row membership record of a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    /// Fuzzy membership weight in `[0, 1]`.
    pub weight: f64,
}

/// A group of rows sharing similar values on one dimension transition.
///
/// `left_dim == right_dim` marks a reflexive (per-dimension) cluster; the
/// boundary dummies at both ends of a plot are reflexive [`ClusterKind::Dummy`]
/// clusters covering every row.
#[derive(Debug, Clone)]
pub struct Cluster {
    name: String,
    left_dim: String,
    right_dim: String,
    kind: ClusterKind,
    classification: HashMap<RowId, Classification>,
}

impl Cluster {
    pub fn new(
        name: impl Into<String>,
        left_dim: impl Into<String>,
        right_dim: impl Into<String>,
        kind: ClusterKind,
    ) -> Self {
        Self {
            name: name.into(),
            left_dim: left_dim.into(),
            right_dim: right_dim.into(),
            kind,
            classification: HashMap::default(),
        }
    }

    /// A dummy cluster containing every row with full weight.
    pub fn dummy(
        left_dim: impl Into<String>,
        right_dim: impl Into<String>,
        row_count: usize,
    ) -> Self {
        let left_dim = left_dim.into();
        let right_dim = right_dim.into();
        let mut cluster = Self::new(
            format!("{left_dim}-{right_dim}-dummy"),
            left_dim,
            right_dim,
            ClusterKind::Dummy,
        );
        for row in 0..row_count {
            cluster.classify(row, "", 1.0);
        }
        cluster
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn left_dim(&self) -> &str {
        &self.left_dim
    }

    pub fn right_dim(&self) -> &str {
        &self.right_dim
    }

    pub fn kind(&self) -> ClusterKind {
        self.kind
    }

    /// Records (or replaces) a row's membership.
    pub fn classify(&mut self, row: RowId, category: impl Into<String>, weight: f64) {
        self.classification.insert(
            row,
            Classification {
                category: category.into(),
                weight,
            },
        );
    }

    pub fn classification(&self, row: RowId) -> Option<&Classification> {
        self.classification.get(&row)
    }

    /// The row's fuzzy membership weight, `0.0` when the row is not classified.
    pub fn weight_of(&self, row: RowId) -> f64 {
        self.classification.get(&row).map_or(0.0, |c| c.weight)
    }

    pub fn contains(&self, row: RowId) -> bool {
        self.classification.contains_key(&row)
    }

    /// Number of classified rows.
    pub fn size(&self) -> usize {
        self.classification.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.classification.keys().copied()
    }
}

/// Cluster lists indexed by the dimension pair they were computed between.
///
/// A transition is stored once under `(left, right)`; lookups fall back to the
/// flipped key, so both orientations resolve to the same list.
#[derive(Debug, Clone, Default)]
pub struct ClusterIndex {
    map: HashMap<String, HashMap<String, Vec<Cluster>>>,
}

impl ClusterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cluster under its own `(left_dim, right_dim)` pair.
    pub fn append(&mut self, cluster: Cluster) {
        self.map
            .entry(cluster.left_dim.clone())
            .or_default()
            .entry(cluster.right_dim.clone())
            .or_default()
            .push(cluster);
    }

    /// The clusters between `left` and `right`, empty when the pair is unknown.
    pub fn get(&self, left: &str, right: &str) -> &[Cluster] {
        if let Some(found) = self.map.get(left).and_then(|inner| inner.get(right)) {
            return found;
        }
        self.map
            .get(right)
            .and_then(|inner| inner.get(left))
            .map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The data collaborator handed to the ordering engine.
#[derive(Debug, Clone)]
pub struct PlotData {
    dim_names: Vec<String>,
    dim_index: HashMap<String, usize>,
    row_count: usize,
    clusters: ClusterIndex,
}

impl PlotData {
    pub fn new(dim_names: Vec<String>, row_count: usize) -> Self {
        let dim_index = dim_names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Self {
            dim_names,
            dim_index,
            row_count,
            clusters: ClusterIndex::new(),
        }
    }

    pub fn dim_names(&self) -> &[String] {
        &self.dim_names
    }

    pub fn dim_count(&self) -> usize {
        self.dim_names.len()
    }

    /// The stable input-order index of a dimension name.
    pub fn dim_index(&self, name: &str) -> Option<usize> {
        self.dim_index.get(name).copied()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn rows(&self) -> std::ops::Range<RowId> {
        0..self.row_count
    }

    pub fn add_cluster(&mut self, cluster: Cluster) {
        self.clusters.append(cluster);
    }

    pub fn clusters(&self) -> &ClusterIndex {
        &self.clusters
    }

    pub fn clusters_between(&self, left: &str, right: &str) -> &[Cluster] {
        self.clusters.get(left, right)
    }
}
