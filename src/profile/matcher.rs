use std::collections::HashMap;

use tracing::debug;

use super::types::GenreScore;

/// Similarity between two genre names on a 0..1 scale.
///
/// Exact match (case-insensitive, trimmed) is 1.0 and substring
/// containment either way is 0.8; otherwise the fraction of tokens of
/// the longer name that find a partner in the other. Tokens split on
/// whitespace, hyphens and underscores, and partner when equal or when
/// one is a prefix of the other, so "synth-pop" still meets "synthpop"
/// territory through its parts.
pub fn string_similarity(a: &str, b: &str) -> f32 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.8;
    }

    let tokens_a = tokenize(&a);
    let tokens_b = tokenize(&b);
    let longest = tokens_a.len().max(tokens_b.len());
    if longest == 0 {
        return 0.0;
    }
    let matched = tokens_a
        .iter()
        .filter(|ta| {
            tokens_b
                .iter()
                .any(|tb| ta == &tb || ta.starts_with(tb) || tb.starts_with(*ta))
        })
        .count();
    matched as f32 / longest as f32
}

fn tokenize(name: &str) -> Vec<&str> {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|token| !token.is_empty())
        .collect()
}

/// Projects listener genre scores onto the atlas taxonomy. Listener
/// entries are consumed in the order given (callers pass them sorted by
/// descending score), each claiming its best-scoring unclaimed atlas
/// genre. Ties go to the earlier atlas entry. A claim below or at
/// `acceptance` is dropped without a mapping, and each atlas genre is
/// claimed at most once.
pub fn match_scores_to_atlas(
    scores: &[GenreScore],
    atlas_ids: &[String],
    acceptance: f32,
) -> HashMap<String, f32> {
    let mut claimed = vec![false; atlas_ids.len()];
    let mut mapped = HashMap::new();

    for entry in scores {
        let mut best_index = None;
        let mut best_score = 0.0_f32;
        for (index, id) in atlas_ids.iter().enumerate() {
            if claimed[index] {
                continue;
            }
            let similarity = string_similarity(&entry.genre, id);
            if similarity > best_score {
                best_score = similarity;
                best_index = Some(index);
            }
        }
        if let Some(index) = best_index
            && best_score > acceptance
        {
            claimed[index] = true;
            mapped.insert(atlas_ids[index].clone(), entry.score);
        }
    }

    debug!(
        listener_genres = scores.len(),
        mapped = mapped.len(),
        "projected listener genres onto atlas"
    );
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(genre: &str, value: f32) -> GenreScore {
        GenreScore {
            genre: genre.to_owned(),
            score: value,
        }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn exact_match_beats_substring() {
        assert!((string_similarity("Rock", " rock ") - 1.0).abs() < 1e-6);
        assert!((string_similarity("rock", "post-rock") - 0.8).abs() < 1e-6);

        let mapped = match_scores_to_atlas(
            &[score("rock", 1.0)],
            &ids(&["post-rock", "rock"]),
            0.2,
        );
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped["rock"], 1.0);
    }

    #[test]
    fn token_overlap_uses_the_longer_name() {
        // "indie rock" vs "indie" -> containment, 0.8.
        assert!((string_similarity("indie rock", "indie") - 0.8).abs() < 1e-6);
        // "indie surf rock" vs "indie pop": 1 of 3 tokens matched.
        let s = string_similarity("indie surf rock", "indie pop");
        assert!((s - 1.0 / 3.0).abs() < 1e-6);
        // Prefix counts both ways.
        let s = string_similarity("electro swing", "electronic swing");
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unrelated_names_score_zero() {
        assert_eq!(string_similarity("jazz", "metal"), 0.0);
    }

    #[test]
    fn claims_are_one_to_one() {
        let mapped = match_scores_to_atlas(
            &[score("indie rock", 1.0), score("indie", 0.9)],
            &ids(&["indie rock", "indie pop"]),
            0.2,
        );
        // "indie rock" claims its exact match; "indie" must settle for
        // the remaining entry instead of double-claiming.
        assert_eq!(mapped["indie rock"], 1.0);
        assert_eq!(mapped["indie pop"], 0.9);
    }

    #[test]
    fn similarity_at_acceptance_is_rejected() {
        // One of five tokens matching scores exactly 0.2, which sits on
        // the acceptance boundary and must not map.
        let s = string_similarity("a b c d e", "a x y z w");
        assert!((s - 0.2).abs() < 1e-6);
        let mapped = match_scores_to_atlas(&[score("a b c d e", 1.0)], &ids(&["a x y z w"]), 0.2);
        assert!(mapped.is_empty());
    }

    #[test]
    fn ties_prefer_the_earlier_atlas_entry() {
        // Both candidates contain "pop" the same way.
        let a = string_similarity("pop", "pop rock");
        let b = string_similarity("pop", "pop punk");
        assert!((a - b).abs() < 1e-6);

        let mapped = match_scores_to_atlas(&[score("pop", 0.5)], &ids(&["pop rock", "pop punk"]), 0.2);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped["pop rock"], 0.5);
    }

    #[test]
    fn unmatched_listener_genres_are_dropped_silently() {
        let mapped = match_scores_to_atlas(
            &[score("vaporwave", 0.8), score("jazz", 0.6)],
            &ids(&["jazz"]),
            0.2,
        );
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped["jazz"], 0.6);
    }
}
