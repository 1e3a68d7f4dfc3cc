// ============================================================
// Layer 5b — Candidate Generator
// ============================================================
// Picks the n highest-scoring positions from one logit vector.
//
// Raw logits are ranked directly: no softmax is needed because
// softmax is monotonic and only the ORDER matters here.
//
// Ties keep ascending position order: sort_by is stable, so
// equal logits stay in the order they were enumerated.

/// Indices of the `n` largest logits, highest first.
///
/// Returns `min(n, logits.len())` indices. Ties are broken by
/// lower index first.
pub fn best_indexes(logits: &[f32], n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = logits.iter().copied().enumerate().collect();

    // total_cmp gives a total order, so a stray NaN cannot make
    // the sort non-deterministic
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}
