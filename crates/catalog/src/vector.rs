//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and a stable similarity ranking. The catalog
//! is small, so a linear scan over every stored vector is all we need.

use genie_core::CapabilityDoc;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is empty, the lengths differ, or either norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }

    ((dot / denom).clamp(-1.0, 1.0)) as f32
}

/// Rank docs by cosine similarity to a query embedding.
///
/// Sorted by descending similarity; ties keep their input order. A doc with
/// no embedding scores 0. `limit <= 0` (or a limit past the end) keeps all.
pub fn rank_by_similarity(
    docs: Vec<CapabilityDoc>,
    query_embedding: &[f32],
    limit: i64,
) -> Vec<CapabilityDoc> {
    let mut scored: Vec<(f32, CapabilityDoc)> = docs
        .into_iter()
        .map(|doc| {
            let sim = doc
                .embedding
                .as_deref()
                .map(|emb| cosine_similarity(emb, query_embedding))
                .unwrap_or(0.0);
            (sim, doc)
        })
        .collect();

    // sort_by is stable, so equal scores stay in storage order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    if limit > 0 && (limit as usize) < scored.len() {
        scored.truncate(limit as usize);
    }
    scored.into_iter().map(|(_, doc)| doc).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(function: &str, embedding: Option<Vec<f32>>) -> CapabilityDoc {
        let mut doc = CapabilityDoc::new("test", function);
        doc.embedding = embedding;
        doc
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_small_magnitude_self_similarity_is_one() {
        let v = vec![5e-6, 5e-6];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6, "got {sim}");
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn cosine_empty_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &b);
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
    }

    #[test]
    fn cosine_stays_in_range() {
        let pairs = [
            (vec![3.0, -4.0, 0.5], vec![-1.0, 2.0, 7.0]),
            (vec![1e-3, 1e3], vec![1e3, 1e-3]),
            (vec![0.1, 0.1, 0.1, 0.1], vec![0.1, 0.1, 0.1, 0.1]),
            (vec![-5.0, -5.0], vec![5.0, 5.0]),
        ];
        for (a, b) in pairs {
            let sim = cosine_similarity(&a, &b);
            assert!((-1.0..=1.0).contains(&sim), "{sim} out of range");
        }
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn ranks_by_similarity() {
        let query = vec![1.0, 0.0, 0.0];
        let docs = vec![
            doc("a", Some(vec![0.0, 1.0, 0.0])), // orthogonal = 0
            doc("b", Some(vec![1.0, 0.0, 0.0])), // identical = 1
            doc("c", Some(vec![0.5, 0.5, 0.0])), // partial = ~0.707
        ];

        let ranked = rank_by_similarity(docs, &query, 10);
        let names: Vec<_> = ranked.iter().map(|d| d.function.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let query = vec![1.0, 0.0];
        let docs = vec![
            doc("first", Some(vec![2.0, 0.0])),
            doc("second", Some(vec![1.0, 0.0])),
            doc("third", Some(vec![5.0, 0.0])),
        ];
        let ranked = rank_by_similarity(docs, &query, 0);
        let names: Vec<_> = ranked.iter().map(|d| d.function.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn limit_truncates_and_non_positive_keeps_all() {
        let query = vec![1.0, 0.0];
        let docs: Vec<_> = (0..10)
            .map(|i| doc(&format!("f{i}"), Some(vec![1.0, i as f32 * 0.1])))
            .collect();

        assert_eq!(rank_by_similarity(docs.clone(), &query, 3).len(), 3);
        assert_eq!(rank_by_similarity(docs.clone(), &query, 0).len(), 10);
        assert_eq!(rank_by_similarity(docs.clone(), &query, -1).len(), 10);
        assert_eq!(rank_by_similarity(docs, &query, 50).len(), 10);
    }

    #[test]
    fn missing_embedding_scores_zero() {
        let query = vec![1.0, 0.0];
        let docs = vec![doc("none", None), doc("some", Some(vec![1.0, 0.0]))];
        let ranked = rank_by_similarity(docs, &query, 0);
        assert_eq!(ranked[0].function, "some");
        assert_eq!(ranked[1].function, "none");
    }
}
