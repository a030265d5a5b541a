//! Per-node neighbor selection.
//!
//! For node `i`, candidates `j != i` are ranked by similarity (descending),
//! then by record id (ascending). Candidates are accepted in rank order
//! until one falls below the threshold or `top_k` have been accepted.
//!
//! Two strategies implement the same contract and return identical results:
//! [`ExactSearch`] materializes the n×n matrix; [`BlockedSearch`] keeps only
//! a bounded heap per node.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use convo_topics::similarity::{cosine_with_norms, l2_norm, similarity_matrix};
use convo_types::RecordId;

use crate::error::GraphError;

/// An accepted neighbor of some node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the neighbor in the embedding batch
    pub index: usize,
    /// Cosine similarity to the node
    pub similarity: f32,
}

/// Strategy for selecting neighbors.
///
/// Embeddings must already share one dimension. Returns one list per row,
/// each in rank order and at most `top_k` long.
pub trait NeighborSearch {
    fn search(
        &self,
        embeddings: &[&[f32]],
        ids: &[RecordId],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<Vec<Neighbor>>, GraphError>;
}

/// NaN similarities rank below everything and never pass a threshold.
fn rank_key(similarity: f32) -> f32 {
    if similarity.is_nan() {
        f32::NEG_INFINITY
    } else {
        similarity
    }
}

/// `Less` when `a` ranks ahead of `b`.
fn rank_order(a: &Neighbor, b: &Neighbor, ids: &[RecordId]) -> Ordering {
    rank_key(b.similarity)
        .total_cmp(&rank_key(a.similarity))
        .then_with(|| ids[a.index].cmp(&ids[b.index]))
}

/// Full-matrix search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSearch;

impl NeighborSearch for ExactSearch {
    fn search(
        &self,
        embeddings: &[&[f32]],
        ids: &[RecordId],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<Vec<Neighbor>>, GraphError> {
        let matrix = similarity_matrix(embeddings)?;
        let n = embeddings.len();

        let selected = (0..n)
            .map(|i| {
                let mut candidates: Vec<Neighbor> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| Neighbor {
                        index: j,
                        similarity: matrix[i][j],
                    })
                    .collect();
                candidates.sort_by(|a, b| rank_order(a, b, ids));

                let mut accepted = Vec::with_capacity(top_k.min(candidates.len()));
                for candidate in candidates {
                    // Sorted, so nothing after this can qualify
                    if rank_key(candidate.similarity) < threshold {
                        break;
                    }
                    if accepted.len() >= top_k {
                        break;
                    }
                    accepted.push(candidate);
                }
                accepted
            })
            .collect();

        Ok(selected)
    }
}

/// Blocked search without materializing the matrix.
///
/// Similarities are computed one block of rows at a time; each row keeps a
/// heap of at most `top_k` qualifying candidates.
#[derive(Debug, Clone, Copy)]
pub struct BlockedSearch {
    block_size: usize,
}

impl BlockedSearch {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for BlockedSearch {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Heap entry ordered so the worst kept candidate sits on top.
struct Ranked<'a> {
    neighbor: Neighbor,
    ids: &'a [RecordId],
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_order(&self.neighbor, &other.neighbor, self.ids)
    }
}

impl NeighborSearch for BlockedSearch {
    fn search(
        &self,
        embeddings: &[&[f32]],
        ids: &[RecordId],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<Vec<Neighbor>>, GraphError> {
        convo_topics::check_dimensions(embeddings)?;

        let n = embeddings.len();
        let norms: Vec<f32> = embeddings.iter().map(|e| l2_norm(e)).collect();
        let mut selected = Vec::with_capacity(n);
        let mut tile = vec![0.0f32; self.block_size.min(n) * n];

        for start in (0..n).step_by(self.block_size) {
            let end = (start + self.block_size).min(n);
            debug!(start, end, "Scanning similarity block");

            for i in start..end {
                let row = &mut tile[(i - start) * n..(i - start + 1) * n];
                for (j, slot) in row.iter_mut().enumerate() {
                    *slot = cosine_with_norms(embeddings[i], embeddings[j], norms[i], norms[j]);
                }
            }

            for i in start..end {
                let row = &tile[(i - start) * n..(i - start + 1) * n];
                let mut heap: BinaryHeap<Ranked<'_>> = BinaryHeap::with_capacity(top_k + 1);

                for (j, &similarity) in row.iter().enumerate() {
                    if j == i || rank_key(similarity) < threshold {
                        continue;
                    }
                    let candidate = Ranked {
                        neighbor: Neighbor {
                            index: j,
                            similarity,
                        },
                        ids,
                    };
                    if heap.len() < top_k {
                        heap.push(candidate);
                    } else if let Some(worst) = heap.peek() {
                        if candidate < *worst {
                            heap.pop();
                            heap.push(candidate);
                        }
                    }
                }

                selected.push(
                    heap.into_sorted_vec()
                        .into_iter()
                        .map(|r| r.neighbor)
                        .collect(),
                );
            }
        }

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: usize) -> Vec<RecordId> {
        (0..n).map(|i| RecordId::from(format!("n{:02}", i))).collect()
    }

    fn as_slices(rows: &[Vec<f32>]) -> Vec<&[f32]> {
        rows.iter().map(Vec::as_slice).collect()
    }

    fn indices(neighbors: &[Neighbor]) -> Vec<usize> {
        neighbors.iter().map(|n| n.index).collect()
    }

    fn spiral(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| {
                let t = i as f32 * 0.7;
                vec![t.cos(), t.sin(), (t * 0.3).cos(), 0.2]
            })
            .collect()
    }

    #[test]
    fn test_exact_respects_threshold_and_cap() {
        let rows = spiral(12);
        let ids = ids(12);
        let selected = ExactSearch.search(&as_slices(&rows), &ids, 0.5, 3).unwrap();

        assert_eq!(selected.len(), 12);
        for (i, neighbors) in selected.iter().enumerate() {
            assert!(neighbors.len() <= 3);
            for n in neighbors {
                assert_ne!(n.index, i);
                assert!(n.similarity >= 0.5);
            }
            for pair in neighbors.windows(2) {
                assert!(pair[0].similarity >= pair[1].similarity);
            }
        }
    }

    #[test]
    fn test_blocked_matches_exact() {
        let rows = spiral(23);
        let ids = ids(23);
        let slices = as_slices(&rows);
        for (threshold, top_k) in [(0.3, 5), (0.9, 2), (-1.0, 30)] {
            let exact = ExactSearch.search(&slices, &ids, threshold, top_k).unwrap();
            for block in [1, 4, 64] {
                let blocked = BlockedSearch::new(block)
                    .search(&slices, &ids, threshold, top_k)
                    .unwrap();
                assert_eq!(exact, blocked);
            }
        }
    }

    #[test]
    fn test_ties_broken_by_id() {
        // Three identical candidates for node 0
        let rows = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ];
        let ids = vec![
            RecordId::from("m"),
            RecordId::from("z"),
            RecordId::from("a"),
            RecordId::from("k"),
        ];
        let slices = as_slices(&rows);

        let exact = ExactSearch.search(&slices, &ids, 0.3, 2).unwrap();
        assert_eq!(indices(&exact[0]), vec![2, 3]);

        let blocked = BlockedSearch::new(2).search(&slices, &ids, 0.3, 2).unwrap();
        assert_eq!(indices(&blocked[0]), vec![2, 3]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rows = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        let ids = ids(2);
        let selected = ExactSearch.search(&as_slices(&rows), &ids, 1.0, 5).unwrap();
        assert_eq!(indices(&selected[0]), vec![1]);
    }

    #[test]
    fn test_zero_vectors_do_not_crash() {
        let rows = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]];
        let ids = ids(3);
        let slices = as_slices(&rows);
        let exact = ExactSearch.search(&slices, &ids, 0.3, 5).unwrap();
        assert!(exact.iter().all(|n| n.is_empty()));

        let blocked = BlockedSearch::default().search(&slices, &ids, 0.3, 5).unwrap();
        assert_eq!(exact, blocked);
    }

    #[test]
    fn test_nan_never_selected() {
        let rows = vec![vec![f32::NAN, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]];
        let ids = ids(3);
        let slices = as_slices(&rows);
        let exact = ExactSearch.search(&slices, &ids, -1.0, 5).unwrap();
        assert!(exact[0].is_empty());
        assert_eq!(indices(&exact[1]), vec![2]);

        let blocked = BlockedSearch::new(1).search(&slices, &ids, -1.0, 5).unwrap();
        assert_eq!(exact, blocked);
    }

    #[test]
    fn test_dimension_mismatch() {
        let rows = vec![vec![1.0, 0.0], vec![1.0]];
        let ids = ids(2);
        let slices = as_slices(&rows);
        assert!(ExactSearch
            .search(&slices, &ids, 0.3, 5)
            .unwrap_err()
            .is_dimension_mismatch());
        assert!(BlockedSearch::default()
            .search(&slices, &ids, 0.3, 5)
            .unwrap_err()
            .is_dimension_mismatch());
    }
}
