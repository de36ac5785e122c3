//! TF-IDF vectorization of short tag documents.
//!
//! Tokens are runs of at least two word characters, lowercased, with English
//! stop words removed. Weights use smoothed IDF, `ln((1 + n) / (1 + df)) + 1`,
//! and every document vector is L2-normalized so that a dot product between
//! two rows is their cosine similarity.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse row: (term index, weight) pairs sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Fitted vocabulary and IDF weights
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    stop_words: HashSet<&'static str>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    /// Unfitted vectorizer using the English stop word list
    pub fn new() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.idf[i])
    }

    /// Lowercased tokens of two or more word characters, stop words removed
    pub fn tokenize<'a>(&'a self, text: &str) -> impl Iterator<Item = String> + 'a {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into_iter()
            .filter(move |token| !self.stop_words.contains(token.as_str()))
    }

    /// Learns the vocabulary and IDF weights, then vectorizes `documents`
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Vec<SparseVector> {
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| term_counts(self.tokenize(doc.as_ref())))
            .collect();

        // Alphabetical vocabulary so term indices do not depend on hash order
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f64;
        self.vocabulary = doc_freq
            .keys()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();
        self.idf = doc_freq
            .values()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        counts.iter().map(|doc| self.weigh(doc)).collect()
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let mut row: SparseVector = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&index| (index, count as f64 * self.idf[index]))
            })
            .collect();
        row.sort_by_key(|&(index, _)| index);
        normalize(&mut row);
        row
    }
}

fn term_counts(tokens: impl Iterator<Item = String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Scales a row to unit L2 norm; zero rows are left untouched
fn normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, weight) in row.iter_mut() {
            *weight /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dot product of two sparse rows sorted by term index
    fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    #[test]
    fn test_tokenize_splits_hyphens_and_drops_stop_words() {
        let vectorizer = TfidfVectorizer::new();
        let tokens: Vec<String> = vectorizer
            .tokenize("To-Read science-fiction Young-Adult a b")
            .collect();
        assert_eq!(tokens, vec!["read", "science", "fiction", "young", "adult"]);
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit_transform(&["zombies apocalypse", "magic"]);
        assert_eq!(vectorizer.vocabulary_size(), 3);
        assert_eq!(vectorizer.term_index("apocalypse"), Some(0));
        assert_eq!(vectorizer.term_index("magic"), Some(1));
        assert_eq!(vectorizer.term_index("zombies"), Some(2));
    }

    #[test]
    fn test_smoothed_idf() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit_transform(&["fantasy magic", "fantasy", "romance"]);
        // fantasy: df = 2 of 3 documents
        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("fantasy").unwrap() - expected).abs() < 1e-12);
        // magic: df = 1
        let expected = 2.0f64.ln() + 1.0;
        assert!((vectorizer.idf("magic").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::new();
        let rows = vectorizer.fit_transform(&["fantasy magic magic", "romance", ""]);
        for row in &rows[..2] {
            assert!((dot(row, row) - 1.0).abs() < 1e-12);
        }
        assert!(rows[2].is_empty());
    }

    #[test]
    fn test_dot_disjoint_rows() {
        assert_eq!(dot(&[(0, 1.0)], &[(1, 1.0)]), 0.0);
        assert!((dot(&[(0, 0.6), (2, 0.8)], &[(2, 1.0)]) - 0.8).abs() < 1e-12);
    }
}
