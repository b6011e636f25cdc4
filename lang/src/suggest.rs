use std::collections::BTreeMap;

const MAX_SUGGESTIONS: usize = 4;

/// Ranks `candidates` against a misspelled `name`.
///
/// Prefix matches come first, then substring matches, then candidates whose
/// character-count difference from `name` is below their own length.
pub fn get_suggestions<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let needle = name.to_ascii_lowercase();
    let mut pool: Vec<&str> = candidates.into_iter().collect();
    pool.sort_unstable();
    pool.dedup();

    let mut prefix: Vec<&str> = Vec::new();
    let mut substring: Vec<&str> = Vec::new();
    let mut distant: Vec<(usize, &str)> = Vec::new();
    for candidate in pool {
        let lowered = candidate.to_ascii_lowercase();
        if lowered == needle {
            continue;
        }
        if lowered.starts_with(&needle) {
            prefix.push(candidate);
        } else if lowered.contains(&needle) {
            substring.push(candidate);
        } else {
            let distance = count_distance(&needle, &lowered);
            if distance < lowered.chars().count() {
                distant.push((distance, candidate));
            }
        }
    }
    prefix.sort_by_key(|c| (c.len(), *c));
    substring.sort_by_key(|c| (c.len(), *c));
    distant.sort();

    let mut out: Vec<String> = Vec::new();
    for candidate in prefix
        .into_iter()
        .chain(substring)
        .chain(distant.into_iter().map(|(_, c)| c))
    {
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
        if !out.iter().any(|seen| seen == candidate) {
            out.push(candidate.to_string());
        }
    }
    out
}

/// Sum of per-character count differences between two strings.
fn count_distance(a: &str, b: &str) -> usize {
    let mut counts: BTreeMap<char, i64> = BTreeMap::new();
    for ch in a.chars() {
        *counts.entry(ch).or_default() += 1;
    }
    for ch in b.chars() {
        *counts.entry(ch).or_default() -= 1;
    }
    counts.values().map(|v| v.unsigned_abs() as usize).sum()
}
