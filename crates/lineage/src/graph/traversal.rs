//! Reachability and ordering algorithms over adjacency lists.
//!
//! Nodes are stable `usize` indices; each adjacency list holds the indices
//! reachable in one step. The same routines serve both edge directions: the
//! caller passes either the dependents lists (downstream) or the
//! dependencies lists (upstream).

use std::collections::VecDeque;

/// Breadth-first reachability from `start`, excluding `start` itself.
///
/// Returns every reachable node paired with its shortest distance from
/// `start` (direct neighbours are at depth 1), in BFS discovery order.
/// Traversal stops expanding at `max_depth` when one is given.
pub(super) fn reachable_with_depth(
    adjacency: &[Vec<usize>],
    start: usize,
    max_depth: Option<usize>,
) -> Vec<(usize, usize)> {
    let mut result = Vec::new();
    let mut visited = vec![false; adjacency.len()];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    visited[start] = true;
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        for &next in &adjacency[current] {
            if !visited[next] {
                visited[next] = true;
                result.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }
    }

    result
}

/// Outcome of a topological sort attempt.
pub(super) enum TopoOrder {
    /// Every node was ordered; dependencies precede their dependents.
    Complete(Vec<usize>),
    /// Some nodes could not be ordered because they sit on or below a cycle.
    Cyclic(Vec<usize>),
}

/// Kahn's algorithm over the forward (dependency -> dependent) edges.
///
/// Ties are broken by node index, so the order is deterministic for a given
/// registration order.
pub(super) fn topological_order(dependents: &[Vec<usize>]) -> TopoOrder {
    let mut in_degree = vec![0usize; dependents.len()];
    for targets in dependents {
        for &target in targets {
            in_degree[target] += 1;
        }
    }

    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(node, _)| node)
        .collect();
    let mut order = Vec::with_capacity(dependents.len());

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &target in &dependents[node] {
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                queue.push_back(target);
            }
        }
    }

    if order.len() == dependents.len() {
        TopoOrder::Complete(order)
    } else {
        let stuck = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree > 0)
            .map(|(node, _)| node)
            .collect();
        TopoOrder::Cyclic(stuck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 -> 1 -> 2, 0 -> 3
    fn diamond_free() -> Vec<Vec<usize>> {
        vec![vec![1, 3], vec![2], vec![], vec![]]
    }

    #[test]
    fn bfs_reports_shortest_depth() {
        let adjacency = vec![vec![1, 2], vec![2], vec![]];
        let reached = reachable_with_depth(&adjacency, 0, None);

        assert_eq!(reached, vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn bfs_excludes_start_and_respects_max_depth() {
        let reached = reachable_with_depth(&diamond_free(), 0, Some(1));
        assert_eq!(reached, vec![(1, 1), (3, 1)]);

        let reached = reachable_with_depth(&diamond_free(), 0, None);
        assert_eq!(reached, vec![(1, 1), (3, 1), (2, 2)]);
    }

    #[test]
    fn bfs_terminates_on_cycles() {
        let adjacency = vec![vec![1], vec![0]];
        assert_eq!(reachable_with_depth(&adjacency, 0, None), vec![(1, 1)]);
    }

    #[test]
    fn topological_order_of_dag() {
        match topological_order(&diamond_free()) {
            TopoOrder::Complete(order) => assert_eq!(order, vec![0, 1, 3, 2]),
            TopoOrder::Cyclic(_) => panic!("acyclic graph reported as cyclic"),
        }
    }

    #[test]
    fn topological_order_reports_cycle_and_downstream_nodes() {
        // 0 is a root, 1 <-> 2 is a cycle, 3 hangs below the cycle
        let dependents = vec![vec![1], vec![2], vec![1, 3], vec![]];

        match topological_order(&dependents) {
            TopoOrder::Cyclic(stuck) => assert_eq!(stuck, vec![1, 2, 3]),
            TopoOrder::Complete(order) => panic!("cycle not detected: {order:?}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        assert!(matches!(
            topological_order(&[vec![0]]),
            TopoOrder::Cyclic(stuck) if stuck == vec![0]
        ));
    }
}
