use std::collections::BTreeMap;

use crate::extraction::sections::SectionCategory;

pub const BASE_CONFIDENCE: f64 = 25.0;
pub const MIN_CONFIDENCE: u8 = 25;
pub const MAX_CONFIDENCE: u8 = 100;

/// Category weights for document confidence. These are independent of how the field
/// extractors treat values and voice.
pub fn category_weight(category: SectionCategory) -> f64 {
    match category {
        SectionCategory::Mission => 25.0,
        SectionCategory::Vision => 25.0,
        SectionCategory::Values => 30.0,
        SectionCategory::Voice => 20.0,
    }
}

/// Confidence that a document carried real brand signal, in [25, 100].
///
/// Every category with at least one passage adds `weight * min(1, count / 2)` to a
/// base of 25. When no category has any passage the result is exactly 25.
pub fn score_confidence(counts: &BTreeMap<SectionCategory, usize>) -> u8 {
    let mut total = BASE_CONFIDENCE;
    let mut has_content = false;

    for (&category, &count) in counts {
        if count > 0 {
            has_content = true;
            total += category_weight(category) * (count as f64 / 2.0).min(1.0);
        }
    }

    if !has_content {
        return MIN_CONFIDENCE;
    }

    total
        .round()
        .clamp(MIN_CONFIDENCE as f64, MAX_CONFIDENCE as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::extraction::sections::SectionCategory::*;

    fn scored<const N: usize>(counts: [(SectionCategory, usize); N]) -> u8 {
        score_confidence(&BTreeMap::from(counts))
    }

    #[test]
    fn test_empty_mapping_is_floor() {
        assert_eq!(score_confidence(&BTreeMap::new()), 25);
    }

    #[test]
    fn test_all_categories_empty_is_floor() {
        assert_eq!(scored([(Mission, 0), (Vision, 0), (Values, 0), (Voice, 0)]), 25);
    }

    #[test]
    fn test_full_coverage_clamps_to_100() {
        assert_eq!(scored([(Mission, 2), (Vision, 3), (Values, 2), (Voice, 9)]), 100);
    }

    #[test]
    fn test_single_match_counts_half_weight() {
        // 25 + 30 * 0.5 = 40
        assert_eq!(scored([(Values, 1)]), 40);
    }

    #[test]
    fn test_mission_and_voice_full() {
        // 25 + 25 + 20 = 70
        assert_eq!(scored([(Mission, 2), (Voice, 4)]), 70);
    }

    #[test]
    fn test_half_point_rounds_up() {
        // 25 + 25 * 0.5 = 37.5
        assert_eq!(scored([(Mission, 1)]), 38);
    }

    #[test]
    fn test_category_counted_once() {
        assert_eq!(scored([(Mission, 1), (Mission, 1)]), 38);
    }

    fn category() -> impl Strategy<Value = SectionCategory> {
        prop_oneof![Just(Mission), Just(Vision), Just(Values), Just(Voice)]
    }

    proptest! {
        #[test]
        fn prop_confidence_is_bounded(counts in prop::collection::btree_map(category(), 0usize..50, 0..4)) {
            let score = score_confidence(&counts);
            prop_assert!((25..=100).contains(&score));
        }

        #[test]
        fn prop_two_or_more_everywhere_is_100(
            m in 2usize..20, v in 2usize..20, val in 2usize..20, vo in 2usize..20
        ) {
            prop_assert_eq!(scored([(Mission, m), (Vision, v), (Values, val), (Voice, vo)]), 100);
        }

        #[test]
        fn prop_all_zero_is_25(n in 0usize..4) {
            let counts: BTreeMap<_, _> = SectionCategory::ALL.iter().take(n).map(|c| (*c, 0usize)).collect();
            prop_assert_eq!(score_confidence(&counts), 25);
        }
    }
}
