//! String similarity scores on a 0-100 scale.
//!
//! `ratio` is the normalized Indel similarity (insertions and deletions only), and
//! `weighted_ratio` blends it with token and partial variants the way FAQ lookup
//! expects: short inputs are compared whole, long-vs-short inputs by best window.

use std::collections::BTreeSet;

pub fn ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    ratio_chars(&a, &b)
}

pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if shorter.is_empty() {
        return 0.0;
    }

    let window = shorter.len();
    let mut best = 0.0_f64;
    for start in 0..=(longer.len() - window) {
        let score = ratio_chars(&shorter, &longer[start..start + window]);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }

    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let left = a.split_whitespace().collect::<BTreeSet<_>>();
    let right = b.split_whitespace().collect::<BTreeSet<_>>();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).copied().collect::<Vec<_>>();
    let only_left = left.difference(&right).copied().collect::<Vec<_>>();
    let only_right = right.difference(&left).copied().collect::<Vec<_>>();

    if !shared.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 100.0;
    }

    let shared = shared.join(" ");
    let combined_left = join_nonempty(&shared, &only_left.join(" "));
    let combined_right = join_nonempty(&shared, &only_right.join(" "));

    ratio(&shared, &combined_left)
        .max(ratio(&shared, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// 100 as soon as the inputs share a token; otherwise `partial_ratio` of the leftovers.
pub fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    let left = a.split_whitespace().collect::<BTreeSet<_>>();
    let right = b.split_whitespace().collect::<BTreeSet<_>>();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left.intersection(&right).next().is_some() {
        return 100.0;
    }

    let only_left = left.difference(&right).copied().collect::<Vec<_>>();
    let only_right = right.difference(&left).copied().collect::<Vec<_>>();
    partial_ratio(&only_left.join(" "), &only_right.join(" "))
}

pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let base = ratio(a, b);

    if len_ratio < 1.5 {
        return base
            .max(token_sort_ratio(a, b) * 0.95)
            .max(token_set_ratio(a, b) * 0.95);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let partial_tokens = partial_token_sort_ratio(a, b).max(partial_token_set_ratio(a, b));

    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_tokens * 0.95 * partial_scale)
}

/// Best scoring choice at or above `cutoff`. The earliest choice wins ties.
pub fn extract_one<'a, I>(query: &str, choices: I, cutoff: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, f64)> = None;

    for (index, choice) in choices.into_iter().enumerate() {
        let score = weighted_ratio(query, choice);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((index, score)),
        }
    }

    best
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let indel = total - 2 * lcs_len(a, b);
    100.0 * (1.0 - indel as f64 / total as f64)
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for lhs in a {
        for (j, rhs) in b.iter().enumerate() {
            current[j + 1] = if lhs == rhs {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn sorted_tokens(input: &str) -> String {
    let mut tokens = input.split_whitespace().collect::<Vec<_>>();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_matches_indel_similarity() {
        assert_eq!(ratio("hi", "hi"), 100.0);
        assert!((ratio("hi", "hii") - 80.0).abs() < 1e-9);
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn partial_ratio_finds_embedded_text() {
        assert_eq!(partial_ratio("support", "how can i contact support"), 100.0);
    }

    #[test]
    fn token_variants_ignore_word_order() {
        assert_eq!(token_sort_ratio("your name is what", "what is your name"), 100.0);
        assert_eq!(token_set_ratio("name your", "what is your name"), 100.0);
    }

    #[test]
    fn weighted_ratio_tolerates_small_typos() {
        assert!(weighted_ratio("hii", "hi") >= 70.0);
        assert!(weighted_ratio("how r you", "how are you") >= 70.0);
        assert!(weighted_ratio("zzz qwerty", "how are you") < 70.0);
        assert_eq!(weighted_ratio("", "hi"), 0.0);
    }

    #[test]
    fn partial_token_scores() {
        assert_eq!(
            partial_token_set_ratio("keywords purpose", "what purpose do keywords serve"),
            100.0
        );
        assert_eq!(partial_token_sort_ratio("is name", "your name is what"), 100.0);
        assert_eq!(partial_token_set_ratio("", "hi"), 0.0);
    }

    #[test]
    fn shared_token_lifts_long_choice_over_threshold() {
        let score = weighted_ratio(
            "keywords purpose",
            "what purpose do keywords serve in a manuscript",
        );
        assert!((score - 85.5).abs() < 1e-9, "{score}");
    }

    #[test]
    fn extract_one_applies_cutoff() {
        let choices = ["hi", "how are you"];
        assert_eq!(extract_one("hi", choices, 70.0).map(|(idx, _)| idx), Some(0));
        assert_eq!(extract_one("qwerty", choices, 70.0), None);
    }
}
