//! Axis and cluster ordering for clustered parallel-coordinates plots.
//!
//! Two best-first searches over an arena-backed tree drive the layout:
//! [`AxisOrder`] finds a permutation of all dimensions minimizing an
//! accumulated pair/triple dissimilarity cost, and [`ClusterOrder`] finds, per
//! adjacent axis pair, the cluster permutation minimizing the exact number of
//! line crossings. Cluster data comes from the read-only collaborator types in
//! [`kelp_clusters`].

pub use kelp_clusters as clusters;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod search;
pub mod util;

mod axis_order;
pub use axis_order::{AxisOrder, cluster_distance, dim_distance};

mod cluster_order;
pub use cluster_order::{
    AxisCost, ClusterOrder, ClusterOrderCosts, PERMUTATION_LIMIT, connection_matrix,
    sort_by_cluster_size,
};

mod cross_count;
pub use cross_count::cross_count;

mod error;
pub use error::{OrderError, Result};
