//! Seeded k-means clustering of embeddings.
//!
//! # Algorithm
//!
//! 1. Pick k initial centroids with k-means++ seeding
//! 2. Assign each vector to its nearest centroid (squared Euclidean)
//! 3. Move each centroid to the mean of its members
//! 4. Repeat until the total centroid shift falls under the tolerance
//!
//! The whole procedure runs `n_init` times from a single RNG seeded with
//! `seed`; the run with the lowest inertia is kept. The same input and
//! configuration always reproduce the same partition.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::config::ClusteringConfig;
use crate::error::TopicsError;
use crate::similarity::{check_dimensions, squared_distance};

/// Documents per cluster used to derive the cluster count.
const DOCS_PER_CLUSTER: usize = 5;

/// Derive the cluster count for `n` valid records.
///
/// `max(1, min(max_clusters, n / 5))`
pub fn cluster_count(n: usize, max_clusters: usize) -> usize {
    (n / DOCS_PER_CLUSTER).min(max_clusters).max(1)
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index per input row, in `[0, k)`
    pub assignments: Vec<usize>,
    /// Final centroids
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    /// Lloyd iterations taken by the winning run
    pub iterations: usize,
}

impl KMeansResult {
    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Member count per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.len()];
        for &cluster in &self.assignments {
            sizes[cluster] += 1;
        }
        sizes
    }
}

/// K-means clusterer.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: ClusteringConfig,
}

impl KMeans {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Partition `data` into `k` clusters.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `data` is empty or `k` is not in `1..=data.len()`
    /// - `DimensionMismatch` if rows differ in length
    #[instrument(skip(self, data), fields(n = data.len()))]
    pub fn fit<V: AsRef<[f32]>>(&self, data: &[V], k: usize) -> Result<KMeansResult, TopicsError> {
        self.config.validate()?;

        if data.is_empty() {
            return Err(TopicsError::InvalidInput(
                "Cannot cluster an empty batch".to_string(),
            ));
        }
        if k == 0 || k > data.len() {
            return Err(TopicsError::InvalidInput(format!(
                "k ({}) must be in 1..={}",
                k,
                data.len()
            )));
        }
        let dim = check_dimensions(data)?;

        let rows: Vec<&[f32]> = data.iter().map(|r| r.as_ref()).collect();
        let tolerance = self.config.tolerance * mean_variance(&rows, dim);
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut best: Option<KMeansResult> = None;
        for run in 0..self.config.n_init {
            let initial = kmeans_plus_plus(&rows, k, &mut rng);
            let result = self.lloyd(&rows, initial, tolerance);

            debug!(
                run,
                inertia = result.inertia,
                iterations = result.iterations,
                "k-means run complete"
            );

            // Strict comparison keeps the earliest run on ties
            let better = match &best {
                Some(current) => result.inertia < current.inertia,
                None => true,
            };
            if better {
                best = Some(result);
            }
        }

        let best = best.ok_or_else(|| TopicsError::InvalidConfig("n_init must be > 0".to_string()))?;
        debug!(k, inertia = best.inertia, sizes = ?best.cluster_sizes(), "k-means finished");
        Ok(best)
    }

    fn lloyd(&self, rows: &[&[f32]], mut centroids: Vec<Vec<f64>>, tolerance: f64) -> KMeansResult {
        let k = centroids.len();
        let mut assignments = vec![0usize; rows.len()];
        let mut iterations = 0;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;
            assign(rows, &centroids, &mut assignments);

            let updated = update_centroids(rows, &assignments, &centroids);
            let shift: f64 = centroids
                .iter()
                .zip(updated.iter())
                .map(|(old, new)| {
                    old.iter()
                        .zip(new.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>()
                })
                .sum();
            centroids = updated;

            if shift <= tolerance {
                break;
            }
        }

        // Final assignment against the converged centroids
        let inertia = assign(rows, &centroids, &mut assignments);
        debug_assert_eq!(centroids.len(), k);

        KMeansResult {
            assignments,
            centroids,
            inertia,
            iterations,
        }
    }
}

/// Assign each row to its nearest centroid; returns the inertia.
///
/// Equal distances go to the lowest centroid index.
fn assign(rows: &[&[f32]], centroids: &[Vec<f64>], assignments: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (i, row) in rows.iter().enumerate() {
        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;
        for (c, centroid) in centroids.iter().enumerate() {
            let dist = squared_distance(row, centroid);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        assignments[i] = best_cluster;
        inertia += best_dist;
    }
    inertia
}

/// Recompute centroids as member means. Empty clusters keep their centroid.
fn update_centroids(rows: &[&[f32]], assignments: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = previous.first().map(|c| c.len()).unwrap_or(0);
    let mut sums = vec![vec![0.0f64; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (row, &cluster) in rows.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        for (acc, &x) in sums[cluster].iter_mut().zip(row.iter()) {
            *acc += x as f64;
        }
    }

    sums.into_iter()
        .zip(counts)
        .enumerate()
        .map(|(c, (sum, count))| {
            if count == 0 {
                previous[c].clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// k-means++ seeding: each next centroid is sampled with probability
/// proportional to its squared distance from the nearest chosen centroid.
fn kmeans_plus_plus(rows: &[&[f32]], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = rows.len();
    let to_f64 = |row: &[f32]| row.iter().map(|&x| x as f64).collect::<Vec<f64>>();

    let mut centroids = Vec::with_capacity(k);
    centroids.push(to_f64(rows[rng.random_range(0..n)]));

    let mut min_dist: Vec<f64> = rows
        .iter()
        .map(|row| squared_distance(row, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = None;
            for (i, &d) in min_dist.iter().enumerate() {
                cumulative += d;
                if d > 0.0 && cumulative > target {
                    chosen = Some(i);
                    break;
                }
            }
            // Rounding can leave the target past the last bucket
            chosen.unwrap_or_else(|| {
                min_dist
                    .iter()
                    .rposition(|&d| d > 0.0)
                    .unwrap_or(n - 1)
            })
        } else {
            // Every row sits on a chosen centroid
            rng.random_range(0..n)
        };

        let centroid = to_f64(rows[next]);
        for (i, row) in rows.iter().enumerate() {
            let d = squared_distance(row, &centroid);
            if d < min_dist[i] {
                min_dist[i] = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Mean of the per-dimension variances.
fn mean_variance(rows: &[&[f32]], dim: usize) -> f64 {
    if rows.is_empty() || dim == 0 {
        return 0.0;
    }
    let n = rows.len() as f64;
    let mut total = 0.0;
    for d in 0..dim {
        let mean = rows.iter().map(|r| r[d] as f64).sum::<f64>() / n;
        total += rows
            .iter()
            .map(|r| {
                let x = r[d] as f64 - mean;
                x * x
            })
            .sum::<f64>()
            / n;
    }
    total / dim as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_cluster_count() {
        assert_eq!(cluster_count(0, 8), 1);
        assert_eq!(cluster_count(1, 8), 1);
        assert_eq!(cluster_count(3, 8), 1);
        assert_eq!(cluster_count(9, 8), 1);
        assert_eq!(cluster_count(10, 8), 2);
        assert_eq!(cluster_count(45, 8), 8);
        assert_eq!(cluster_count(1000, 8), 8);
        assert_eq!(cluster_count(1000, 3), 3);
    }

    #[test]
    fn test_separates_two_blobs() {
        let data = blobs();
        let result = KMeans::default().fit(&data, 2).unwrap();

        assert_eq!(result.k(), 2);
        assert_eq!(result.assignments.len(), 6);
        assert_eq!(result.assignments[0], result.assignments[1]);
        assert_eq!(result.assignments[0], result.assignments[2]);
        assert_eq!(result.assignments[3], result.assignments[4]);
        assert_eq!(result.assignments[3], result.assignments[5]);
        assert_ne!(result.assignments[0], result.assignments[3]);
        assert!(result.inertia < 0.1);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let data: Vec<Vec<f32>> = (0..40)
            .map(|i| {
                let x = (i as f32 * 0.37).sin();
                let y = (i as f32 * 0.91).cos();
                vec![x, y, x * y]
            })
            .collect();
        let kmeans = KMeans::default();
        let a = kmeans.fit(&data, cluster_count(data.len(), 8)).unwrap();
        let b = kmeans.fit(&data, cluster_count(data.len(), 8)).unwrap();

        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_single_cluster() {
        let data = blobs();
        let result = KMeans::default().fit(&data, 1).unwrap();
        assert!(result.assignments.iter().all(|&c| c == 0));
        assert_eq!(result.cluster_sizes(), vec![6]);
    }

    #[test]
    fn test_assignments_in_range() {
        let data = blobs();
        let result = KMeans::default().fit(&data, 3).unwrap();
        assert!(result.assignments.iter().all(|&c| c < 3));
        assert_eq!(result.cluster_sizes().iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_identical_points() {
        let data = vec![vec![1.0, 1.0]; 6];
        let result = KMeans::default().fit(&data, 2).unwrap();
        assert_eq!(result.assignments.len(), 6);
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let data = vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0]];
        let err = KMeans::default().fit(&data, 1).unwrap_err();
        assert!(matches!(
            err,
            TopicsError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_invalid_k() {
        let data = blobs();
        assert!(matches!(
            KMeans::default().fit(&data, 0),
            Err(TopicsError::InvalidInput(_))
        ));
        assert!(matches!(
            KMeans::default().fit(&data, 7),
            Err(TopicsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            KMeans::default().fit(&data, 1),
            Err(TopicsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_seed_changes_are_accepted() {
        let data = blobs();
        let config = ClusteringConfig {
            seed: 7,
            n_init: 3,
            ..Default::default()
        };
        let result = KMeans::new(config).fit(&data, 2).unwrap();
        assert_ne!(result.assignments[0], result.assignments[3]);
    }
}
