//! Kahn's algorithm over step indices.
//!
//! Nodes are plan positions. `dependencies[i]` lists the positions step `i`
//! waits for and `dependents[i]` the positions waiting for `i`; both are
//! free of duplicates.

use std::collections::BTreeSet;

/// Groups nodes into rounds: every node's dependencies lie in earlier rounds.
/// Nodes inside a round keep declaration order.
///
/// On a cyclic graph, returns the nodes that could never be scheduled.
pub(crate) fn rounds(
    dependencies: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> Result<Vec<Vec<usize>>, Vec<usize>> {
    let mut pending: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut current: Vec<usize> = (0..pending.len()).filter(|&i| pending[i] == 0).collect();
    let mut scheduled = 0;
    let mut rounds = Vec::new();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &node in &current {
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort_unstable();
        scheduled += current.len();
        rounds.push(std::mem::replace(&mut current, next));
    }

    if scheduled == pending.len() {
        Ok(rounds)
    } else {
        Err((0..pending.len()).filter(|&i| pending[i] > 0).collect())
    }
}

/// Topological order that always picks the earliest-declared ready node.
///
/// This is the order a single worker executes the plan in.
pub(crate) fn order(dependencies: &[Vec<usize>], dependents: &[Vec<usize>]) -> Vec<usize> {
    let mut pending: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BTreeSet<usize> = (0..pending.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(pending.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);
        for &dependent in &dependents[node] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    order
}

/// Extracts one concrete cycle from the nodes left over by [`rounds`].
///
/// Every leftover node has at least one leftover dependency, so following
/// dependencies from any of them must revisit a node. The returned path
/// starts and ends with the same node.
pub(crate) fn find_cycle(dependencies: &[Vec<usize>], leftover: &[usize]) -> Vec<usize> {
    let Some(&start) = leftover.first() else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut node = start;
    loop {
        let Some(&next) = dependencies[node]
            .iter()
            .find(|dep| leftover.binary_search(dep).is_ok())
        else {
            return path;
        };

        if let Some(pos) = path.iter().position(|&seen| seen == next) {
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return cycle;
        }
        path.push(next);
        node = next;
    }
}
