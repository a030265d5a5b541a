//! Document-term counting for keyword extraction.
//!
//! Pure Rust bag-of-words vectorizer: lowercased alphanumeric tokens, English
//! stop words removed, vocabulary capped at the most frequent terms.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse term counts for one document: (vocabulary index, count), sorted by index.
pub type TermCounts = Vec<(usize, u32)>;

/// Fitted vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    /// Terms in alphabetical order; position is the term index
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    extra_stop_words: HashSet<String>,
}

impl CountVectorizer {
    /// Fit a vocabulary over `documents`.
    ///
    /// Keeps the `max_features` terms with the highest corpus frequency;
    /// frequency ties are resolved alphabetically.
    pub fn fit(documents: &[&str], max_features: usize, extra_stop_words: &[String]) -> Self {
        let extra_stop_words: HashSet<String> =
            extra_stop_words.iter().map(|w| w.to_lowercase()).collect();

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            for term in tokenize(doc, &extra_stop_words) {
                *frequencies.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort();

        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        Self {
            vocabulary,
            index,
            extra_stop_words,
        }
    }

    /// Count vocabulary terms in one document.
    pub fn transform(&self, document: &str) -> TermCounts {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for term in tokenize(document, &self.extra_stop_words) {
            if let Some(&i) = self.index.get(&term) {
                *counts.entry(i).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Fit and transform in one pass over the corpus.
    pub fn fit_transform(
        documents: &[&str],
        max_features: usize,
        extra_stop_words: &[String],
    ) -> (Self, Vec<TermCounts>) {
        let vectorizer = Self::fit(documents, max_features, extra_stop_words);
        let counts = documents.iter().map(|d| vectorizer.transform(d)).collect();
        (vectorizer, counts)
    }

    /// Term at a vocabulary index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.vocabulary.get(index).map(String::as_str)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

/// Tokenize text into lowercase words.
///
/// Filters out:
/// - Stop words (common English words plus `extra`)
/// - Single character tokens
/// - Numbers
pub fn tokenize(text: &str, extra: &HashSet<String>) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() > 1)
        .filter(|s| !is_stop_word(s))
        .filter(|s| !extra.contains(*s))
        .filter(|s| !s.chars().all(|c| c.is_numeric()))
        .map(String::from)
        .collect()
}

/// Check if a word is an English stop word.
pub fn is_stop_word(word: &str) -> bool {
    const STOP_WORDS: &[&str] = &[
        "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
        "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
        "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
        "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "been",
        "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
        "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing",
        "done", "down", "due", "during", "each", "eg", "either", "else", "elsewhere", "enough",
        "etc", "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few",
        "first", "for", "former", "formerly", "from", "further", "get", "give", "go", "had", "has",
        "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hers", "herself",
        "him", "himself", "his", "how", "however", "ie", "if", "in", "indeed", "into", "is", "it",
        "its", "itself", "just", "keep", "last", "latter", "least", "less", "made", "many", "may",
        "me", "meanwhile", "might", "more", "moreover", "most", "mostly", "much", "must", "my",
        "myself", "namely", "neither", "never", "nevertheless", "next", "no", "nobody", "none",
        "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one",
        "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
        "over", "own", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
        "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
        "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
        "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
        "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
        "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
        "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
        "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
        "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
        "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ];

    STOP_WORDS.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_extra() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_stop_words_sorted() {
        // binary_search relies on the list being sorted
        assert!(is_stop_word("about"));
        assert!(is_stop_word("the"));
        assert!(is_stop_word("yourselves"));
        assert!(is_stop_word("and"));
        assert!(!is_stop_word("rust"));
        assert!(!is_stop_word("budget"));
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(tokenize("Hello World", &no_extra()), vec!["hello", "world"]);
    }

    #[test]
    fn test_tokenize_filters() {
        let tokens = tokenize("the quick brown fox, a b c 123 456 rust!", &no_extra());
        assert_eq!(tokens, vec!["quick", "brown", "fox", "rust"]);
    }

    #[test]
    fn test_tokenize_extra_stop_words() {
        let extra: HashSet<String> = ["user".to_string()].into_iter().collect();
        let tokens = tokenize("User: plan flights", &extra);
        assert_eq!(tokens, vec!["plan", "flights"]);
    }

    #[test]
    fn test_tokenize_unicode_two_chars() {
        let tokens = tokenize("é café", &no_extra());
        assert_eq!(tokens, vec!["café"]);
    }

    #[test]
    fn test_fit_vocabulary_sorted() {
        let docs = vec!["rust programming", "python programming"];
        let vectorizer = CountVectorizer::fit(&docs, 1000, &[]);
        assert_eq!(
            vectorizer.vocabulary(),
            &["programming".to_string(), "python".to_string(), "rust".to_string()]
        );
    }

    #[test]
    fn test_fit_caps_vocabulary_by_frequency() {
        let docs = vec!["rust rust rust python python java", "rust go"];
        let vectorizer = CountVectorizer::fit(&docs, 2, &[]);
        // rust=4, python=2, java=1 ("go" is a stop word)
        assert_eq!(
            vectorizer.vocabulary(),
            &["python".to_string(), "rust".to_string()]
        );
    }

    #[test]
    fn test_fit_cap_tie_break_alphabetical() {
        let docs = vec!["zeta alpha mid"];
        let vectorizer = CountVectorizer::fit(&docs, 2, &[]);
        assert_eq!(
            vectorizer.vocabulary(),
            &["alpha".to_string(), "mid".to_string()]
        );
    }

    #[test]
    fn test_transform_counts() {
        let docs = vec!["travel budget travel", "flights"];
        let (vectorizer, counts) = CountVectorizer::fit_transform(&docs, 1000, &[]);
        let travel = vectorizer.vocabulary().iter().position(|t| t == "travel").unwrap();
        let budget = vectorizer.vocabulary().iter().position(|t| t == "budget").unwrap();
        assert_eq!(counts[0], vec![(budget, 1), (travel, 2)]);
        assert_eq!(counts[1].len(), 1);
        assert_eq!(vectorizer.term(counts[1][0].0), Some("flights"));
    }

    #[test]
    fn test_empty_corpus() {
        let docs: Vec<&str> = vec![];
        let vectorizer = CountVectorizer::fit(&docs, 1000, &[]);
        assert!(vectorizer.is_empty());
        assert!(vectorizer.transform("anything here").is_empty());
    }

    #[test]
    fn test_stop_words_only_corpus() {
        let docs = vec!["the and of", "is it"];
        let (vectorizer, counts) = CountVectorizer::fit_transform(&docs, 1000, &[]);
        assert_eq!(vectorizer.vocabulary_size(), 0);
        assert!(counts.iter().all(|c| c.is_empty()));
    }
}
