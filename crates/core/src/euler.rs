use common::error::Error;
use common::types::{Edge, Tour};

use super::csr::ArcCSR;

/// Closed Eulerian walk over a directed multigraph (Hierholzer).
///
/// Every arc is used exactly once. The walk starts and ends at `start`, so its length
/// is `arcs.len() + 1`. Nodes without arcs are ignored.
///
/// # Errors
/// Returns `Error::NotEulerian` if some node is unbalanced (in-degree != out-degree) or
/// the arcs do not form a single connected component reachable from `start`.
pub fn eulerian_circuit(num_nodes: usize, arcs: &[Edge], start: usize) -> Result<Vec<usize>, Error> {
    if start >= num_nodes {
        return Err(Error::NodeIndexOutOfBounds(start));
    }
    if arcs.is_empty() {
        return Ok(vec![start]);
    }

    let csr = ArcCSR::from_arcs(num_nodes, arcs)?;
    let in_degrees = csr.in_degrees();
    if let Some(u) = (0..num_nodes).find(|&u| csr.out_degree(u) != in_degrees[u]) {
        return Err(Error::NotEulerian(format!(
            "node {} has in-degree {} and out-degree {}",
            u,
            in_degrees[u],
            csr.out_degree(u)
        )));
    }

    // Next unused arc of every node.
    let mut cursor: Vec<usize> = csr.node_pointers[..num_nodes].to_vec();
    let mut stack = vec![start];
    let mut circuit = Vec::with_capacity(arcs.len() + 1);

    while let Some(&v) = stack.last() {
        if cursor[v] < csr.node_pointers[v + 1] {
            let next = csr.arc_targets[cursor[v]];
            cursor[v] += 1;
            stack.push(next);
        } else {
            circuit.push(v);
            stack.pop();
        }
    }
    circuit.reverse();

    if circuit.len() != arcs.len() + 1 {
        return Err(Error::NotEulerian(format!(
            "walk from node {} used {} of {} arcs",
            start,
            circuit.len().saturating_sub(1),
            arcs.len()
        )));
    }

    Ok(circuit)
}

/// Orients an undirected multigraph in which every node has even degree.
///
/// Each connected component is walked as an undirected Euler circuit and every edge is
/// emitted in the direction it was traversed, so the returned arcs are balanced
/// (in-degree == out-degree at every node).
///
/// # Errors
/// Returns `Error::NotEulerian` if a node has odd degree.
pub fn orient_even_multigraph(num_nodes: usize, edges: &[Edge]) -> Result<Vec<Edge>, Error> {
    let mut degree = vec![0usize; num_nodes];
    let mut both_ways = Vec::with_capacity(edges.len() * 2);
    for (id, &(u, v)) in edges.iter().enumerate() {
        if u >= num_nodes || v >= num_nodes {
            return Err(Error::NodeIndexOutOfBounds(u.max(v)));
        }
        degree[u] += 1;
        degree[v] += 1;
        both_ways.push((u, v, id));
        both_ways.push((v, u, id));
    }
    if let Some(u) = (0..num_nodes).find(|&u| degree[u] % 2 == 1) {
        return Err(Error::NotEulerian(format!(
            "node {} has odd degree {}",
            u, degree[u]
        )));
    }

    let csr = ArcCSR::from_labelled_arcs(num_nodes, &both_ways)?;
    let mut used = vec![false; edges.len()];
    let mut cursor: Vec<usize> = csr.node_pointers[..num_nodes].to_vec();
    let mut oriented = Vec::with_capacity(edges.len());

    for root in 0..num_nodes {
        let mut stack: Vec<(usize, Option<Edge>)> = vec![(root, None)];

        while let Some(&(v, _)) = stack.last() {
            let end = csr.node_pointers[v + 1];
            while cursor[v] < end && used[csr.arc_labels[cursor[v]]] {
                cursor[v] += 1;
            }

            if cursor[v] < end {
                let idx = cursor[v];
                used[csr.arc_labels[idx]] = true;
                cursor[v] += 1;
                let next = csr.arc_targets[idx];
                stack.push((next, Some((v, next))));
            } else if let Some((_, via)) = stack.pop() {
                if let Some(arc) = via {
                    oriented.push(arc);
                }
            }
        }
    }

    Ok(oriented)
}

/// Turns a closed walk into a Hamiltonian tour by keeping first visits only.
///
/// Under the triangle inequality skipping repeated nodes never increases the cost.
///
/// # Errors
/// Returns `Error::IncompleteTour` when the walk misses any of the `num_nodes` nodes;
/// a partial tour is never returned.
pub fn shortcut(walk: &[usize], num_nodes: usize) -> Result<Tour, Error> {
    let mut visited = vec![false; num_nodes];
    let mut tour = Vec::with_capacity(num_nodes);

    for &node in walk {
        let seen = visited
            .get_mut(node)
            .ok_or(Error::NodeIndexOutOfBounds(node))?;
        if !*seen {
            *seen = true;
            tour.push(node);
        }
    }

    if tour.len() != num_nodes {
        return Err(Error::IncompleteTour {
            visited: tour.len(),
            expected: num_nodes,
        });
    }

    Ok(tour)
}
