//! Diverse top-K selection over ranked candidates.

use serde::Serialize;

use crate::outcome::{Candidate, compare_outcomes};

/// Picks returned by [`select_diverse`], best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub picks: Vec<Candidate>,
    /// False when fewer than `k` mutually time-separated candidates existed and
    /// the remainder was filled from the fastest leftovers.
    pub diversity_satisfied: bool,
}

/// Greedy diverse top-`k`.
///
/// Walks the pool best first and keeps a candidate only if its flight time is
/// at least `min_time_diff` away from every kept one. If that yields fewer
/// than `k`, the shortfall is filled from the best remaining candidates.
pub fn select_diverse(pool: &[Candidate], k: usize, min_time_diff: f64) -> Selection {
    let mut ranked: Vec<Candidate> = pool.to_vec();
    ranked.sort_by(|a, b| compare_outcomes(&a.outcome, &b.outcome));

    let mut taken = vec![false; ranked.len()];
    let mut picks: Vec<Candidate> = Vec::with_capacity(k);

    for (index, candidate) in ranked.iter().enumerate() {
        if picks.len() == k {
            break;
        }
        let separated = picks
            .iter()
            .all(|kept| (kept.flight_time() - candidate.flight_time()).abs() >= min_time_diff);
        if separated {
            picks.push(*candidate);
            taken[index] = true;
        }
    }

    let diversity_satisfied = picks.len() == k;
    if !diversity_satisfied {
        for (index, candidate) in ranked.iter().enumerate() {
            if picks.len() == k {
                break;
            }
            if !taken[index] {
                picks.push(*candidate);
            }
        }
        picks.sort_by(|a, b| compare_outcomes(&a.outcome, &b.outcome));
    }

    Selection {
        picks,
        diversity_satisfied,
    }
}
