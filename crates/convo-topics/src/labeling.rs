//! Topic labeling using keyword extraction.
//!
//! Each cluster is named after the terms its members use most: counts are
//! summed across member documents, ranked, and the top terms are joined and
//! title-cased (e.g. `"Travel, Budget, Flights"`).

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::config::LabelingConfig;
use crate::vectorizer::CountVectorizer;

/// Label for clusters without members or without usable vocabulary.
pub const MISC_LABEL: &str = "Misc";

/// Generated topic label with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicLabel {
    /// Cluster index
    pub cluster: usize,
    /// Human-readable label
    pub label: String,
    /// Keywords in rank order, with their summed counts
    pub keywords: Vec<(String, u32)>,
    /// Number of member documents
    pub size: usize,
}

impl TopicLabel {
    /// Fallback label for a degenerate cluster.
    pub fn misc(cluster: usize, size: usize) -> Self {
        Self {
            cluster,
            label: MISC_LABEL.to_string(),
            keywords: Vec::new(),
            size,
        }
    }

    pub fn is_misc(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Trait for naming clusters from their member documents.
pub trait TopicLabeler: Send + Sync {
    /// Produce one label per cluster index in `0..k`.
    ///
    /// `texts` and `assignments` are aligned. Must not fail: degenerate
    /// clusters get [`MISC_LABEL`].
    fn label_clusters(&self, texts: &[&str], assignments: &[usize], k: usize)
        -> BTreeMap<usize, TopicLabel>;
}

/// Keyword-based topic labeler using summed term counts.
///
/// This is the default labeler; it requires no external dependencies.
#[derive(Debug, Clone, Default)]
pub struct KeywordLabeler {
    config: LabelingConfig,
}

impl KeywordLabeler {
    /// Create a new keyword labeler.
    pub fn new(config: LabelingConfig) -> Self {
        Self { config }
    }

    /// Rank vocabulary terms by summed count over `members`.
    ///
    /// Count ties are broken alphabetically so labels never depend on hash order.
    fn rank_terms(
        &self,
        vectorizer: &CountVectorizer,
        counts: &[Vec<(usize, u32)>],
        members: &[usize],
    ) -> Vec<(String, u32)> {
        let mut totals: BTreeMap<usize, u32> = BTreeMap::new();
        for &doc in members {
            for &(term, count) in &counts[doc] {
                *totals.entry(term).or_insert(0) += count;
            }
        }

        let mut ranked: Vec<(String, u32)> = totals
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .filter_map(|(term, count)| vectorizer.term(term).map(|t| (t.to_string(), count)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.top_keywords);
        ranked
    }
}

impl TopicLabeler for KeywordLabeler {
    #[instrument(skip(self, texts, assignments), fields(docs = texts.len()))]
    fn label_clusters(
        &self,
        texts: &[&str],
        assignments: &[usize],
        k: usize,
    ) -> BTreeMap<usize, TopicLabel> {
        let (vectorizer, counts) = CountVectorizer::fit_transform(
            texts,
            self.config.max_features,
            &self.config.extra_stop_words,
        );
        debug!(vocabulary = vectorizer.vocabulary_size(), "Fitted vocabulary");

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (doc, &cluster) in assignments.iter().enumerate().take(texts.len()) {
            if let Some(list) = members.get_mut(cluster) {
                list.push(doc);
            }
        }

        members
            .iter()
            .enumerate()
            .map(|(cluster, docs)| {
                if docs.is_empty() {
                    return (cluster, TopicLabel::misc(cluster, 0));
                }

                let keywords = self.rank_terms(&vectorizer, &counts, docs);
                if keywords.is_empty() {
                    debug!(cluster, "No usable vocabulary, using fallback label");
                    return (cluster, TopicLabel::misc(cluster, docs.len()));
                }

                let joined = keywords
                    .iter()
                    .map(|(term, _)| term.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                let label = TopicLabel {
                    cluster,
                    label: title_case(&joined),
                    keywords,
                    size: docs.len(),
                };
                debug!(cluster, label = %label.label, size = label.size, "Labeled cluster");
                (cluster, label)
            })
            .collect()
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("travel, budget, flights"), "Travel, Budget, Flights");
        assert_eq!(title_case("rust"), "Rust");
        assert_eq!(title_case("3d printing"), "3D Printing");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_labels_by_summed_counts() {
        let texts = vec![
            "travel budget flights travel",
            "travel flights hotels",
            "rust compiler borrow checker",
            "rust borrow lifetimes",
        ];
        let assignments = vec![0, 0, 1, 1];
        let labels = KeywordLabeler::default().label_clusters(&texts, &assignments, 2);

        assert_eq!(labels.len(), 2);
        // travel=3, flights=2, budget=1 and hotels=1 tie -> budget first
        assert_eq!(labels[&0].label, "Travel, Flights, Budget");
        assert_eq!(labels[&0].size, 2);
        // rust=2, borrow=2 tie -> alphabetical; then checker/compiler/lifetimes at 1
        assert_eq!(labels[&1].label, "Borrow, Rust, Checker");
    }

    #[test]
    fn test_empty_cluster_is_misc() {
        let texts = vec!["alpha beta", "gamma delta"];
        let assignments = vec![0, 0];
        let labels = KeywordLabeler::default().label_clusters(&texts, &assignments, 3);

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[&1].label, MISC_LABEL);
        assert_eq!(labels[&2].label, MISC_LABEL);
        assert_eq!(labels[&1].size, 0);
        assert!(labels[&1].is_misc());
    }

    #[test]
    fn test_stop_word_only_cluster_is_misc() {
        let texts = vec!["the and of", "weather forecast rain"];
        let assignments = vec![0, 1];
        let labels = KeywordLabeler::default().label_clusters(&texts, &assignments, 2);

        assert_eq!(labels[&0].label, MISC_LABEL);
        assert_eq!(labels[&0].size, 1);
        assert_eq!(labels[&1].label, "Forecast, Rain, Weather");
    }

    #[test]
    fn test_empty_vocabulary_never_fails() {
        let texts = vec!["", "a", "12 34"];
        let assignments = vec![0, 1, 1];
        let labels = KeywordLabeler::default().label_clusters(&texts, &assignments, 2);
        assert!(labels.values().all(|l| l.label == MISC_LABEL));
    }

    #[test]
    fn test_speaker_prefixes_ignored() {
        let texts = vec!["User: sourdough starter\nAssistant: sourdough needs flour"];
        let labels = KeywordLabeler::default().label_clusters(&texts, &[0], 1);
        assert_eq!(labels[&0].label, "Sourdough, Flour, Needs");
    }

    #[test]
    fn test_top_keywords_config() {
        let config = LabelingConfig {
            top_keywords: 1,
            ..Default::default()
        };
        let texts = vec!["garden tomato tomato"];
        let labels = KeywordLabeler::new(config).label_clusters(&texts, &[0], 1);
        assert_eq!(labels[&0].label, "Tomato");
        assert_eq!(labels[&0].keywords, vec![("tomato".to_string(), 2)]);
    }

    #[test]
    fn test_labels_deterministic() {
        let texts = vec!["one two three four", "four three two one", "five six"];
        let assignments = vec![0, 0, 1];
        let labeler = KeywordLabeler::default();
        let a = labeler.label_clusters(&texts, &assignments, 2);
        let b = labeler.label_clusters(&texts, &assignments, 2);
        assert_eq!(a, b);
    }
}
