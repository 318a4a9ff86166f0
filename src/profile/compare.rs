use std::collections::HashMap;

/// How a genre relates to the two listeners in comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    SelfOnly,
    FriendOnly,
    Shared,
    Neither,
}

/// Weighted-Jaccard overlap of two projected score maps, as a rounded
/// percentage. Genres missing from one map count as zero there, so the
/// measure rewards agreeing on weights, not just on membership.
pub fn overlap_score(own: &HashMap<String, f32>, friend: &HashMap<String, f32>) -> u32 {
    let mut sum_min = 0.0_f64;
    let mut sum_max = 0.0_f64;

    for (genre, &own_score) in own {
        let friend_score = friend.get(genre).copied().unwrap_or(0.0);
        sum_min += f64::from(own_score.min(friend_score));
        sum_max += f64::from(own_score.max(friend_score));
    }
    for (genre, &friend_score) in friend {
        if own.contains_key(genre) {
            continue;
        }
        sum_max += f64::from(friend_score);
    }

    if sum_max <= 0.0 {
        return 0;
    }
    (100.0 * sum_min / sum_max).round() as u32
}

/// Buckets one genre by which listener is over the relevance threshold.
pub fn classify_relevance(own: f32, friend: f32, threshold: f32) -> Relevance {
    match (own > threshold, friend > threshold) {
        (true, true) => Relevance::Shared,
        (true, false) => Relevance::SelfOnly,
        (false, true) => Relevance::FriendOnly,
        (false, false) => Relevance::Neither,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f32)]) -> HashMap<String, f32> {
        entries
            .iter()
            .map(|(genre, score)| ((*genre).to_owned(), *score))
            .collect()
    }

    #[test]
    fn identical_profiles_score_one_hundred() {
        let own = map(&[("techno", 1.0), ("house", 0.4)]);
        assert_eq!(overlap_score(&own, &own), 100);
    }

    #[test]
    fn disjoint_and_empty_profiles_score_zero() {
        let own = map(&[("techno", 1.0)]);
        let friend = map(&[("country", 1.0)]);
        assert_eq!(overlap_score(&own, &friend), 0);
        assert_eq!(overlap_score(&own, &HashMap::new()), 0);
        assert_eq!(overlap_score(&HashMap::new(), &HashMap::new()), 0);
    }

    #[test]
    fn overlap_is_symmetric_and_weight_sensitive() {
        let own = map(&[("techno", 1.0), ("house", 0.5)]);
        let friend = map(&[("techno", 0.5), ("ambient", 0.5)]);
        // min sum = 0.5, max sum = 1.0 + 0.5 + 0.5 = 2.0 -> 25%.
        assert_eq!(overlap_score(&own, &friend), 25);
        assert_eq!(overlap_score(&friend, &own), 25);
    }

    #[test]
    fn rounding_is_to_nearest_percent() {
        let own = map(&[("a", 1.0), ("b", 0.4)]);
        let friend = map(&[("a", 0.8), ("b", 0.1)]);
        // min 0.9 / max 1.4 = 64.28..% -> 64.
        assert_eq!(overlap_score(&own, &friend), 64);
    }

    #[test]
    fn relevance_buckets_respect_the_threshold() {
        assert_eq!(classify_relevance(0.5, 0.5, 0.1), Relevance::Shared);
        assert_eq!(classify_relevance(0.5, 0.05, 0.1), Relevance::SelfOnly);
        assert_eq!(classify_relevance(0.0, 0.2, 0.1), Relevance::FriendOnly);
        assert_eq!(classify_relevance(0.1, 0.1, 0.1), Relevance::Neither);
    }
}
