use kelp::clusters::{Cluster, ClusterKind, PlotData};
use kelp::{ClusterOrder, connection_matrix, cross_count, sort_by_cluster_size};

/// Three dimensions; the `x-y` and `y-z` transitions carry two disjoint
/// clusters each, wired so the raw order draws four crossings and the flipped
/// order none.
fn order_data() -> PlotData {
    let mut data = PlotData::new(["x", "y", "z"].map(String::from).to_vec(), 4);
    data.add_cluster(Cluster::dummy("x", "x", 4));

    let mut low = Cluster::new("x-y-low", "x", "y", ClusterKind::Regular);
    low.classify(0, "low", 1.0);
    low.classify(1, "low", 1.0);
    let mut high = Cluster::new("x-y-high", "x", "y", ClusterKind::Regular);
    high.classify(2, "high", 1.0);
    high.classify(3, "high", 1.0);
    data.add_cluster(low);
    data.add_cluster(high);

    let mut flipped_high = Cluster::new("y-z-high", "y", "z", ClusterKind::Regular);
    flipped_high.classify(2, "high", 1.0);
    flipped_high.classify(3, "high", 1.0);
    let mut flipped_low = Cluster::new("y-z-low", "y", "z", ClusterKind::Regular);
    flipped_low.classify(0, "low", 1.0);
    flipped_low.classify(1, "low", 1.0);
    data.add_cluster(flipped_high);
    data.add_cluster(flipped_low);

    data
}

fn dim_order() -> Vec<String> {
    ["x", "y", "z"].map(String::from).to_vec()
}

fn total_crossings(data: &PlotData, order: &[Vec<&Cluster>]) -> f64 {
    let mut total = 0.0;
    for axis in 1..order.len() {
        total += cross_count(&connection_matrix(data, &order[axis - 1], &order[axis]));
    }
    total
}

#[test]
fn permutation_search_eliminates_avoidable_crossings() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    let order = solver.cluster_order();

    assert_eq!(order.len(), 3);
    assert_eq!(total_crossings(&data, &order), 0.0);
}

#[test]
fn solved_order_is_no_worse_than_the_heuristic() {
    let data = order_data();

    let mut solver = ClusterOrder::new(&data, dim_order());
    let solved = total_crossings(&data, &solver.cluster_order());

    let mut heuristic_solver = ClusterOrder::new(&data, dim_order());
    heuristic_solver.set_try_permutation(false);
    let heuristic = total_crossings(&data, &heuristic_solver.cluster_order());

    assert!(solved <= heuristic);
    assert_eq!(heuristic, 4.0);
}

#[test]
fn first_axis_keeps_its_single_dummy() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    let indices = solver.order_indices();

    assert_eq!(indices.len(), 3);
    assert_eq!(indices[0], vec![0]);
    assert_eq!(indices[1].len(), 2);
    assert_eq!(indices[2].len(), 2);
}

#[test]
fn costs_report_totals_and_labels() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    let costs = solver.costs();

    assert_eq!(costs.total, 2.0);
    assert_eq!(costs.per_axis.len(), 2);
    assert_eq!(costs.per_axis[0].label, "x-y");
    assert_eq!(costs.per_axis[1].label, "y-z");
    assert_eq!(costs.per_axis[0].cost, 1.0);
    assert_eq!(costs.per_axis[1].cost, 1.0);
    assert!(costs.to_string().contains("\"total\":2.0"));
}

#[test]
fn heuristic_sorts_by_size_with_noise_last() {
    fn cluster_of(name: &str, kind: ClusterKind, rows: &[usize]) -> Cluster {
        let mut cluster = Cluster::new(name, "y", "z", kind);
        for &row in rows {
            cluster.classify(row, "", 1.0);
        }
        cluster
    }

    let clusters = vec![
        cluster_of("small", ClusterKind::Regular, &[0]),
        cluster_of("noise", ClusterKind::Noise, &[0, 1, 2, 3]),
        cluster_of("big", ClusterKind::Regular, &[0, 1, 2]),
    ];
    let mut order: Vec<usize> = (0..clusters.len()).collect();
    sort_by_cluster_size(&mut order, &clusters);

    assert_eq!(order, vec![2, 0, 1]);
}

#[test]
fn override_bypasses_the_search() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    solver.set_override(vec![vec![0], vec![1, 0], vec![0, 1]]);
    let order = solver.cluster_order();

    assert_eq!(order[1][0].name(), "x-y-high");
    assert_eq!(order[1][1].name(), "x-y-low");
    assert_eq!(order[2][0].name(), "y-z-high");
}

#[test]
fn short_override_keeps_remaining_axes_raw() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    solver.set_override(vec![vec![0]]);
    let order = solver.cluster_order();

    assert_eq!(order[1][0].name(), "x-y-low");
    assert_eq!(order[2][0].name(), "y-z-high");
}

#[test]
fn malformed_override_discards_the_whole_result() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    solver.set_override(vec![vec![0], vec![7, 0], vec![0, 1]]);

    assert!(solver.cluster_order().is_empty());
    assert!(solver.order_indices().is_empty());
}

#[test]
fn single_axis_order_is_the_dummy_alone() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, vec!["x".to_string()]);
    let order = solver.cluster_order();

    assert_eq!(order.len(), 1);
    assert_eq!(order[0].len(), 1);
    assert_eq!(order[0][0].kind(), ClusterKind::Dummy);
}

#[test]
fn cluster_order_is_memoized_and_copied() {
    let data = order_data();
    let mut solver = ClusterOrder::new(&data, dim_order());
    let first: Vec<Vec<String>> = solver
        .cluster_order()
        .iter()
        .map(|axis| axis.iter().map(|c| c.name().to_string()).collect())
        .collect();

    let mut copy = solver.cluster_order();
    copy.swap(1, 2);

    let again: Vec<Vec<String>> = solver
        .cluster_order()
        .iter()
        .map(|axis| axis.iter().map(|c| c.name().to_string()).collect())
        .collect();
    assert_eq!(again, first);
}
