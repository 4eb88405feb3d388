use crate::catalog::{RoleCatalog, RoleKey};

/// Minimum similarity score an input must clear against some candidate
/// before we trust the fuzzy match at all. Below this everything resolves
/// to `Default`.
const MATCH_THRESHOLD: f64 = 0.45;

/// Exact-match stage: trimmed, case-insensitive comparison against every
/// canonical name and alias. Returns the owning role on a hit, `None`
/// otherwise. Never returns `Default`.
pub fn resolve_alias(catalog: &RoleCatalog, input: &str) -> Option<RoleKey> {
    let folded = input.trim().to_lowercase();
    if folded.is_empty() {
        return None;
    }
    for entry in catalog.entries() {
        if entry.key.is_default() {
            continue;
        }
        if entry.key.as_str().to_lowercase() == folded {
            return Some(entry.key.clone());
        }
        if entry
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase() == folded)
        {
            return Some(entry.key.clone());
        }
    }
    None
}

/// Fuzzy stage: pick the single best-scoring candidate, or `Default` when
/// nothing clears the threshold. Strict `>` on the running max means the
/// first candidate in catalog order wins ties, so this is fully
/// deterministic for a fixed catalog.
pub fn find_best_match(input: &str, candidates: &[RoleKey]) -> RoleKey {
    let folded = input.trim().to_lowercase();
    if folded.is_empty() {
        return RoleKey::default_key();
    }

    let mut best_score = 0.0;
    let mut best: Option<&RoleKey> = None;
    for candidate in candidates {
        let score = similarity(&folded, &candidate.as_str().to_lowercase());
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    match best {
        Some(key) if best_score >= MATCH_THRESHOLD => key.clone(),
        _ => RoleKey::default_key(),
    }
}

/// Similarity in [0, 1]: the better of a containment ratio (one string
/// inside the other, scored by length overlap) and a normalized
/// Levenshtein similarity. Purely lexical, no semantics.
fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let longer = a_len.max(b_len) as f64;
    let shorter = a_len.min(b_len) as f64;

    let containment = if a.contains(b) || b.contains(a) {
        shorter / longer
    } else {
        0.0
    };
    let edit = 1.0 - levenshtein(a, b) as f64 / longer;

    containment.max(edit)
}

/// Plain single-row Levenshtein over chars, so multi-byte input doesn't
/// split code points.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            current[j + 1] = (prev[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;

    #[test]
    fn every_alias_resolves_to_its_owner() {
        let catalog = builtin_catalog();
        for entry in catalog.entries() {
            for alias in &entry.aliases {
                assert_eq!(
                    resolve_alias(&catalog, alias).as_ref(),
                    Some(&entry.key),
                    "alias `{alias}`"
                );
            }
        }
    }

    #[test]
    fn alias_resolution_ignores_case_and_whitespace() {
        let catalog = builtin_catalog();
        assert_eq!(
            resolve_alias(&catalog, "  BANK MANAGER "),
            Some(RoleKey::new("Branch Manager"))
        );
        assert_eq!(
            resolve_alias(&catalog, "Branch Manager"),
            Some(RoleKey::new("Branch Manager"))
        );
        assert_eq!(
            resolve_alias(&catalog, "sWe"),
            Some(RoleKey::new("Software Engineer"))
        );
    }

    #[test]
    fn alias_stage_never_guesses() {
        let catalog = builtin_catalog();
        assert_eq!(resolve_alias(&catalog, "softare enginer"), None);
        assert_eq!(resolve_alias(&catalog, ""), None);
        assert_eq!(resolve_alias(&catalog, "   "), None);
        // the reserved key itself is not a matchable term
        assert_eq!(resolve_alias(&catalog, "default"), None);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("writer", "writer"), 0);
        assert_eq!(levenshtein("writer", "waiter"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn typo_still_finds_the_role() {
        let catalog = builtin_catalog();
        let keys = catalog.candidate_keys();
        assert_eq!(
            find_best_match("software enginer", &keys),
            RoleKey::new("Software Engineer")
        );
        assert_eq!(find_best_match("Writter", &keys), RoleKey::new("Writer"));
    }

    #[test]
    fn substring_input_matches_containing_key() {
        let catalog = builtin_catalog();
        let keys = catalog.candidate_keys();
        assert_eq!(
            find_best_match("engineer", &keys),
            RoleKey::new("Software Engineer")
        );
    }

    #[test]
    fn garbage_input_falls_to_default() {
        let catalog = builtin_catalog();
        let keys = catalog.candidate_keys();
        assert!(find_best_match("jbo", &keys).is_default());
        assert!(find_best_match("qqqqzzzz", &keys).is_default());
        assert!(find_best_match("", &keys).is_default());
        assert!(find_best_match("   ", &keys).is_default());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let catalog = builtin_catalog();
        let keys = catalog.candidate_keys();
        let first = find_best_match("driver", &keys);
        for _ in 0..50 {
            assert_eq!(find_best_match("driver", &keys), first);
        }
    }

    #[test]
    fn ties_break_by_catalog_order() {
        let keys = vec![RoleKey::new("Baker"), RoleKey::new("Maker")];
        // equidistant from both candidates, first one wins
        assert_eq!(find_best_match("aker", &keys), RoleKey::new("Baker"));
    }
}
