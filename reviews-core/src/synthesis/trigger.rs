//! Regeneration trigger arithmetic

/// Decide whether a derived artifact should be regenerated
///
/// `current_review_count` is the number of reviews already stored, before
/// the pending one is persisted. Fires when the pending review lands on a
/// period boundary. A zero period never fires.
pub fn should_trigger(current_review_count: u64, period: u64) -> bool {
    period != 0 && (current_review_count + 1) % period == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_review_never_fires() {
        assert!(!should_trigger(0, 2));
        assert!(!should_trigger(0, 3));
    }

    #[test]
    fn test_summary_period() {
        let fired: Vec<u64> = (0..10).filter(|&n| should_trigger(n, 3)).collect();
        assert_eq!(fired, vec![2, 5, 8]);
    }

    #[test]
    fn test_keyword_period() {
        let fired: Vec<u64> = (0..8).filter(|&n| should_trigger(n, 2)).collect();
        assert_eq!(fired, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_matches_definition() {
        for period in 1..=7u64 {
            for n in 0..50u64 {
                assert_eq!(should_trigger(n, period), (n + 1) % period == 0);
            }
        }
    }

    #[test]
    fn test_period_one_always_fires() {
        assert!((0..20).all(|n| should_trigger(n, 1)));
    }

    #[test]
    fn test_zero_period_never_fires() {
        assert!((0..20).all(|n| !should_trigger(n, 0)));
    }
}
