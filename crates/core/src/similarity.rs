//! Word-overlap similarity and greedy grouping of near-duplicate questions.

/// Two texts are duplicates when their similarity is strictly above this.
pub const DUPLICATE_THRESHOLD: f64 = 0.70;

/// Words of this many characters or fewer never count as shared.
const MIN_WORD_CHARS: usize = 3;

/// Share of words in common, relative to the longer text.
///
/// A word of `a` counts once if it appears anywhere in `b`; occurrences in
/// `b` are not consumed, so repeated words can count more than a multiset
/// intersection would.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return 0.0;
    }

    let shared = words_a
        .iter()
        .filter(|word| word.chars().count() > MIN_WORD_CHARS && words_b.contains(word))
        .count();

    shared as f64 / longest as f64
}

#[must_use]
pub fn is_duplicate(a: &str, b: &str) -> bool {
    similarity(a, b) > DUPLICATE_THRESHOLD
}

/// A set of near-identical texts, represented by the first one seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<'a> {
    pub key: String,
    pub representative: &'a str,
    pub size: usize,
}

/// Greedy first-match clustering.
///
/// Each text joins the first existing cluster (in creation order) whose key
/// is a duplicate of it, not the most similar one.
#[must_use]
pub fn group<'a, I>(texts: I) -> Vec<Cluster<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut clusters: Vec<Cluster<'a>> = Vec::new();
    for text in texts {
        let key = text.trim().to_lowercase();
        let existing = clusters
            .iter_mut()
            .find(|cluster| cluster.key == key || is_duplicate(&key, &cluster.key));
        match existing {
            Some(cluster) => cluster.size += 1,
            None => clusters.push(Cluster {
                key,
                representative: text,
                size: 1,
            }),
        }
    }
    clusters
}
