// src/dag/width.rs

//! Antichain width of a DAG.
//!
//! Dilworth: the largest antichain has as many nodes as the smallest chain
//! cover, which is `n - |maximum matching|` in the bipartite graph
//! `left(i) -> right(j)` for every pair where `j` is reachable from `i`.
//!
//! Reachability rows are bitsets and the matching is Hopcroft-Karp, so the
//! whole computation is `O(n^2 / 64)` memory and close to `O(e * n / 64)` time
//! for the closure on typical graphs.

use std::collections::VecDeque;

const NIL: usize = usize::MAX;
const INF: usize = usize::MAX;

/// `order` is a topological order of node indices, `dependents[i]` the
/// direct dependents of node `i`.
pub(crate) fn antichain_width(order: &[usize], dependents: &[Vec<usize>]) -> usize {
    let n = order.len();
    if n == 0 {
        return 0;
    }

    let rows = reachability(order, dependents);
    n - maximum_matching(&rows)
}

/// `rows[i]` has bit `j` set when node `j` is a (transitive) dependent of `i`.
fn reachability(order: &[usize], dependents: &[Vec<usize>]) -> Vec<Vec<u64>> {
    let n = order.len();
    let words = n.div_ceil(64);
    let mut rows = vec![vec![0u64; words]; n];

    for &i in order.iter().rev() {
        let mut row = std::mem::take(&mut rows[i]);
        for &d in &dependents[i] {
            row[d / 64] |= 1u64 << (d % 64);
            for (word, downstream) in row.iter_mut().zip(&rows[d]) {
                *word |= *downstream;
            }
        }
        rows[i] = row;
    }

    rows
}

/// Indices of the set bits of a bitset row, ascending.
struct SetBits<'a> {
    row: &'a [u64],
    word: usize,
    bits: u64,
}

impl<'a> SetBits<'a> {
    fn new(row: &'a [u64]) -> Self {
        Self {
            row,
            word: 0,
            bits: row.first().copied().unwrap_or(0),
        }
    }
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.bits == 0 {
            self.word += 1;
            self.bits = *self.row.get(self.word)?;
        }
        let bit = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(self.word * 64 + bit)
    }
}

/// Hopcroft-Karp over bitset adjacency rows; left and right sides both have
/// `rows.len()` vertices.
fn maximum_matching(rows: &[Vec<u64>]) -> usize {
    let n = rows.len();
    let mut pair_left = vec![NIL; n];
    let mut pair_right = vec![NIL; n];
    let mut dist = vec![INF; n];
    let mut matched = 0;

    // Greedy start; on chains and layered graphs this is already maximum.
    for (u, row) in rows.iter().enumerate() {
        if let Some(v) = SetBits::new(row).find(|&v| pair_right[v] == NIL) {
            pair_left[u] = v;
            pair_right[v] = u;
            matched += 1;
        }
    }

    loop {
        let mut queue = VecDeque::new();
        for u in 0..n {
            if pair_left[u] == NIL {
                dist[u] = 0;
                queue.push_back(u);
            } else {
                dist[u] = INF;
            }
        }

        let mut found = false;
        while let Some(u) = queue.pop_front() {
            for v in SetBits::new(&rows[u]) {
                let w = pair_right[v];
                if w == NIL {
                    found = true;
                } else if dist[w] == INF {
                    dist[w] = dist[u] + 1;
                    queue.push_back(w);
                }
            }
        }

        if !found {
            return matched;
        }

        for u in 0..n {
            if pair_left[u] == NIL
                && augment(u, rows, &mut pair_left, &mut pair_right, &mut dist)
            {
                matched += 1;
            }
        }
    }
}

/// Layered DFS from a free left vertex; flips the path when it reaches a
/// free right vertex. Iterative so long chains cannot overflow the stack.
fn augment(
    root: usize,
    rows: &[Vec<u64>],
    pair_left: &mut [usize],
    pair_right: &mut [usize],
    dist: &mut [usize],
) -> bool {
    // (left vertex, remaining neighbours, right vertex taken from it)
    let mut stack: Vec<(usize, SetBits<'_>, usize)> = vec![(root, SetBits::new(&rows[root]), NIL)];

    while let Some(top) = stack.last_mut() {
        let u = top.0;
        let Some(v) = top.1.next() else {
            dist[u] = INF;
            stack.pop();
            continue;
        };

        let w = pair_right[v];
        if w == NIL {
            top.2 = v;
            for &(u, _, v) in &stack {
                pair_left[u] = v;
                pair_right[v] = u;
            }
            return true;
        }

        if dist[w] != INF && dist[w] == dist[u] + 1 {
            top.2 = v;
            stack.push((w, SetBits::new(&rows[w]), NIL));
        }
    }

    false
}
