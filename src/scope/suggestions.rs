//! "Did you mean" suggestions for names that failed to resolve.

use crate::scope::resolver::ScopeResolver;
use crate::syntax::shared_interner::SharedInterner;
use crate::syntax::symbol::Name;

/// Edit distance between two strings, counted in chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(a_char != *b_char);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

fn max_distance(target_len: usize) -> usize {
    match target_len {
        0..=3 => 1,
        4..=6 => 2,
        _ => 3.max(target_len / 3),
    }
}

/// Candidates close to `target`, best first.
///
/// Names are compared case-insensitively for ranking only; a candidate that
/// differs from `target` just by case is the best possible suggestion since
/// names themselves are case-sensitive.
pub fn similar_names<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let target_lower = target.to_lowercase();
    let allowed = max_distance(target.chars().count());

    let mut scored: Vec<(usize, bool, &str)> = candidates
        .into_iter()
        .filter(|candidate| *candidate != target)
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let distance = edit_distance(&target_lower, &lower);
            let prefix = lower.starts_with(&target_lower) || target_lower.starts_with(&lower);
            (distance <= allowed || prefix).then_some((distance, prefix, candidate))
        })
        .collect();

    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.2.cmp(b.2))
    });
    scored.dedup_by(|a, b| a.2 == b.2);

    scored
        .into_iter()
        .take(limit)
        .map(|(_, _, name)| name.to_string())
        .collect()
}

/// Suggestions for an unresolved unqualified `name` among the unqualified
/// names currently in scope.
pub fn suggest_unqualified(
    resolver: &ScopeResolver,
    interner: &SharedInterner,
    name: Name,
    limit: usize,
) -> Vec<String> {
    let target = interner.text_of(name);
    let visible: Vec<String> = resolver
        .visible_names()
        .into_iter()
        .filter(|(namespace, _)| namespace.is_none())
        .map(|(_, candidate)| interner.text_of(candidate))
        .collect();
    similar_names(&target, visible.iter().map(String::as_str), limit)
}
