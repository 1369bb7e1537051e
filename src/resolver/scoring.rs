//! String similarity used to match query tokens.

/// Prefix weight for the Jaro-Winkler boost.
const PREFIX_WEIGHT: f64 = 0.05;
const MAX_PREFIX: usize = 4;
/// Jaro similarity above which the common-prefix boost applies.
const BOOST_THRESHOLD: f64 = 0.7;
/// Score for a query token that is a strict prefix of a name token.
const PREFIX_SCORE: f64 = 0.995;
const MIN_PREFIX_LEN: usize = 3;

/// Jaro-Winkler similarity with a 0.05 prefix weight, in `[0, 1]`.
#[must_use]
pub fn jaro_winkler(left: &str, right: &str) -> f64 {
    let jaro = strsim::jaro(left, right);
    if jaro <= BOOST_THRESHOLD {
        return jaro;
    }
    let prefix = left
        .chars()
        .zip(right.chars())
        .take(MAX_PREFIX)
        .take_while(|(l, r)| l == r)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let prefix = prefix as f64;
    jaro + prefix * PREFIX_WEIGHT * (1.0 - jaro)
}

/// Similarity between a query token and a modifier token.
#[must_use]
pub fn ratio_modifier(token: &str, modifier: &str) -> f64 {
    jaro_winkler(token, modifier)
}

/// Score of query `token` against index name token `full_token`.
///
/// `mwt_len` is the number of words fused into `full_token`. An inexact
/// hit on a fused token scores `base^10 * mwt_len`.
#[must_use]
pub fn ratio_name(token: &str, full_token: &str, mwt_len: usize) -> f64 {
    if token == full_token {
        return 1.0;
    }
    if is_digits(token) && is_digits(full_token) {
        return 0.0;
    }

    let base = if token.chars().count() >= MIN_PREFIX_LEN && full_token.starts_with(token) {
        PREFIX_SCORE
    } else {
        jaro_winkler(token, full_token)
    };

    if mwt_len > 1 {
        #[allow(clippy::cast_precision_loss)]
        let words = mwt_len as f64;
        base.powi(10) * words
    } else {
        base
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(close(jaro_winkler("saria", "saria"), 1.0));
        assert!(close(ratio_name("saria", "saria", 1), 1.0));
    }

    #[test]
    fn prefix_boost_is_light() {
        let jaro = strsim::jaro("reincarnatd", "reincarnated");
        let boosted = jaro_winkler("reincarnatd", "reincarnated");
        assert!(close(boosted, jaro + 4.0 * 0.05 * (1.0 - jaro)));
        assert!(boosted >= 0.95);
    }

    #[test]
    fn weak_matches_get_no_boost() {
        let jaro = strsim::jaro("abcdef", "abzzzz");
        assert!(jaro <= BOOST_THRESHOLD);
        assert!(close(jaro_winkler("abcdef", "abzzzz"), jaro));
    }

    #[test]
    fn distinct_numbers_never_match() {
        assert!(close(ratio_name("1234", "1235", 1), 0.0));
        assert!(close(ratio_name("123", "1234", 1), 0.0));
    }

    #[test]
    fn prefixes_score_just_below_exact() {
        assert!(close(ratio_name("sar", "sarias", 1), PREFIX_SCORE));
        assert!(ratio_name("sa", "sarias", 1) < PREFIX_SCORE);
    }

    #[test]
    fn fused_tokens_are_penalized() {
        let penalized = ratio_name("flame", "flamelord", 2);
        assert!(close(penalized, PREFIX_SCORE.powi(10) * 2.0));
        assert!(close(ratio_name("flamelord", "flamelord", 2), 1.0));

        let fuzzy = ratio_name("flamelrd", "flamelord", 3);
        let base = jaro_winkler("flamelrd", "flamelord");
        assert!(close(fuzzy, base.powi(10) * 3.0));
    }
}
