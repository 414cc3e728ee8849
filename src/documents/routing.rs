use super::id::DocumentKind;

/// Categories a free-text query targets. A query that names no category
/// searches all of them.
pub fn route(query: &str) -> Vec<DocumentKind> {
    let query = query.to_lowercase();
    let matched: Vec<DocumentKind> = DocumentKind::ALL
        .into_iter()
        .filter(|kind| kind.keywords().iter().any(|kw| query.contains(kw)))
        .collect();

    if matched.is_empty() {
        DocumentKind::ALL.to_vec()
    } else {
        matched
    }
}

/// Split `limit` across `parts` categories. Shares differ by at most one and
/// always sum to `limit`, so some categories get 0 when `limit < parts`.
pub fn split_limit(limit: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = limit / parts;
    let extra = limit % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

/// Each routed category paired with its share of `limit`.
pub fn plan(query: &str, limit: usize) -> Vec<(DocumentKind, usize)> {
    let kinds = route(query);
    let shares = split_limit(limit, kinds.len());
    kinds.into_iter().zip(shares).collect()
}
