//! Composite scoring.
//!
//! The composite is an unweighted sum of two 0-100 scales (critic score and
//! positive review percentage). No normalization is applied.

use crate::enrichment::ReviewTally;

/// Combine the two criteria into one ranking value.
pub fn composite_score(critic_score: f64, user_score: f64) -> f64 {
    critic_score + user_score
}

/// Positive reviews as a percentage of all reviews.
///
/// Returns `None` when there are no reviews at all. Counts are summed in
/// `f64` so upstream values near `u64::MAX` cannot overflow.
pub fn review_percentage(tally: &ReviewTally) -> Option<f64> {
    if tally.positive == 0 && tally.negative == 0 {
        return None;
    }
    let total = tally.positive as f64 + tally.negative as f64;
    Some(tally.positive as f64 / total * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_percentage() {
        let tally = ReviewTally {
            positive: 120,
            negative: 30,
        };
        assert_eq!(review_percentage(&tally), Some(80.0));
    }

    #[test]
    fn test_review_percentage_no_reviews() {
        let tally = ReviewTally {
            positive: 0,
            negative: 0,
        };
        assert_eq!(review_percentage(&tally), None);
    }

    #[test]
    fn test_review_percentage_all_negative() {
        let tally = ReviewTally {
            positive: 0,
            negative: 12,
        };
        assert_eq!(review_percentage(&tally), Some(0.0));
    }

    #[test]
    fn test_review_percentage_divides_before_scaling() {
        let tally = ReviewTally {
            positive: 1,
            negative: 2,
        };
        assert_eq!(review_percentage(&tally), Some(33.33333333333333));

        for positive in 0..50u64 {
            for negative in 0..50u64 {
                if positive + negative == 0 {
                    continue;
                }
                let expected = positive as f64 / (positive + negative) as f64 * 100.0;
                let tally = ReviewTally { positive, negative };
                assert_eq!(
                    review_percentage(&tally),
                    Some(expected),
                    "tally {}/{}",
                    positive,
                    negative
                );
            }
        }
    }

    #[test]
    fn test_review_percentage_huge_counts() {
        let tally = ReviewTally {
            positive: u64::MAX,
            negative: u64::MAX,
        };
        assert_eq!(review_percentage(&tally), Some(50.0));
    }

    #[test]
    fn test_composite_is_plain_sum() {
        assert_eq!(composite_score(85.0, 80.0), 165.0);
        assert_eq!(composite_score(0.0, 0.0), 0.0);
    }
}
