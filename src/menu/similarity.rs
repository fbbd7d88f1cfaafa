//! Ratcliff/Obershelp string similarity.
//!
//! [`ratio`] returns `2·M / T` where `T` is the total number of characters in
//! both strings and `M` the number of characters covered by the recursively
//! found longest common blocks.  Identical strings score `1.0`, strings with
//! nothing in common score `0.0`.
//!
//! Comparison is per Unicode scalar value, so Hangul syllables count as one
//! character each.

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Similarity of `a` and `b` in `[0.0, 1.0]`.
///
/// ```
/// use kiosk_voice_macro::menu::similarity::ratio;
///
/// assert_eq!(ratio("latte", "latte"), 1.0);
/// assert_eq!(ratio("abcd", "bcde"), 0.75);
/// assert_eq!(ratio("", ""), 1.0);
/// ```
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Strip every whitespace character and lowercase the rest.
///
/// ```
/// use kiosk_voice_macro::menu::similarity::normalize;
///
/// assert_eq!(normalize("  Iced  Latte "), "icedlatte");
/// assert_eq!(normalize("아이스 아메리카노"), "아이스아메리카노");
/// ```
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Matching blocks
// ---------------------------------------------------------------------------

/// Total size of all matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common block inside `a[alo..ahi]` / `b[blo..bhi]`.
///
/// Returns `(i, j, k)` with `a[i..i+k] == b[j..j+k]`.  Among blocks of equal
/// length the one starting earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    if alo >= ahi || blo >= bhi {
        return (best_i, best_j, best_k);
    }

    // run[j - blo + 1] = length of the match ending at (i - 1, j)
    let width = bhi - blo + 1;
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[slot - 1] + 1;
                cur[slot] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                cur[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_k)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(close(ratio("아메리카노", "아메리카노"), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn one_empty_side_scores_zero() {
        assert!(close(ratio("", "latte"), 0.0));
    }

    #[test]
    fn recursive_blocks_are_counted() {
        // "ab" + "d" match on both sides of the differing middle character
        assert!(close(ratio("abxd", "abyd"), 0.75));
    }

    #[test]
    fn known_reference_values() {
        // 2 * 4 / 10
        assert!(close(ratio("wxyz1", "wxyz2"), 0.8));
        // the leftmost single-char block ("t") leaves nothing matchable after it
        assert!(close(ratio("tide", "diet"), 0.25));
    }

    #[test]
    fn argument_order_changes_the_score() {
        assert!(close(ratio("caadcac", "caaada"), 10.0 / 13.0));
        assert!(close(ratio("caaada", "caadcac"), 8.0 / 13.0));
    }

    #[test]
    fn hangul_compares_per_syllable() {
        // 아메리카노 (5) vs 아메리카 (4): 2*4/9
        assert!(close(ratio("아메리카노", "아메리카"), 8.0 / 9.0));
    }

    #[test]
    fn normalize_strips_whitespace_and_case() {
        assert_eq!(normalize("Vanilla Latte"), "vanillalatte");
        assert_eq!(normalize("\tA B\nC "), "abc");
    }
}
