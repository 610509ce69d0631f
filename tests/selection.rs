use std::cmp::Ordering;

use olympic_goal::flight::KickParameters;
use olympic_goal::search::{Candidate, Outcome, compare_outcomes, select_diverse};
use proptest::prelude::*;

fn goal(time: f64, near_post: bool) -> Candidate {
    Candidate {
        kick: KickParameters::new(25.0, 20.0, time, -100.0),
        outcome: Outcome::Goal {
            near_post,
            flight_time_s: time,
        },
        crossing: None,
    }
}

fn miss(distance: f64) -> Candidate {
    Candidate {
        kick: KickParameters::new(25.0, 20.0, distance, -100.0),
        outcome: Outcome::Miss {
            min_distance_m: distance,
        },
        crossing: None,
    }
}

fn times(picks: &[Candidate]) -> Vec<f64> {
    picks.iter().map(Candidate::flight_time).collect()
}

#[test]
fn outcomes_rank_near_post_then_far_post_then_misses() {
    let near_slow = goal(2.0, true).outcome;
    let near_fast = goal(1.2, true).outcome;
    let far_fast = goal(0.9, false).outcome;
    let close_miss = miss(0.3).outcome;
    let wide_miss = miss(8.0).outcome;

    assert_eq!(compare_outcomes(&near_fast, &near_slow), Ordering::Less);
    assert_eq!(compare_outcomes(&near_slow, &far_fast), Ordering::Less);
    assert_eq!(compare_outcomes(&far_fast, &close_miss), Ordering::Less);
    assert_eq!(compare_outcomes(&close_miss, &wide_miss), Ordering::Less);
    assert_eq!(compare_outcomes(&wide_miss, &wide_miss), Ordering::Equal);
}

#[test]
fn picks_fastest_goals_that_are_far_enough_apart() {
    let pool = [
        goal(1.50, true),
        goal(1.30, true),
        goal(1.32, true),
        goal(1.40, true),
        goal(1.36, true),
    ];
    let selection = select_diverse(&pool, 3, 0.05);
    assert!(selection.diversity_satisfied);
    assert_eq!(times(&selection.picks), vec![1.30, 1.36, 1.50]);
}

#[test]
fn fills_with_fastest_leftovers_when_spacing_cannot_be_met() {
    let pool = [goal(1.30, true), goal(1.31, true), goal(1.32, true), goal(1.60, true)];
    let selection = select_diverse(&pool, 3, 0.1);
    assert!(!selection.diversity_satisfied);
    assert_eq!(times(&selection.picks), vec![1.30, 1.31, 1.60]);
}

#[test]
fn small_pools_return_everything() {
    let pool = [goal(1.4, true), goal(1.2, true)];
    let selection = select_diverse(&pool, 5, 0.0);
    assert!(!selection.diversity_satisfied);
    assert_eq!(times(&selection.picks), vec![1.2, 1.4]);

    let empty = select_diverse(&[], 3, 0.05);
    assert!(empty.picks.is_empty());
}

#[test]
fn zero_spacing_is_plain_top_k() {
    let pool = [goal(1.3, true), goal(1.3, true), goal(1.1, true), goal(1.7, true)];
    let selection = select_diverse(&pool, 3, 0.0);
    assert!(selection.diversity_satisfied);
    assert_eq!(times(&selection.picks), vec![1.1, 1.3, 1.3]);
}

fn goal_pool() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec((0.5f64..3.0, any::<bool>()), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(time, near_post)| goal(time, near_post))
            .collect()
    })
}

proptest! {
    #[test]
    fn selection_size_is_min_of_k_and_pool(pool in goal_pool(), k in 1usize..8, spacing in 0.0f64..0.5) {
        let selection = select_diverse(&pool, k, spacing);
        prop_assert_eq!(selection.picks.len(), k.min(pool.len()));
    }

    #[test]
    fn satisfied_selections_respect_spacing(pool in goal_pool(), k in 1usize..8, spacing in 0.0f64..0.5) {
        let selection = select_diverse(&pool, k, spacing);
        if selection.diversity_satisfied {
            for (i, a) in selection.picks.iter().enumerate() {
                for b in &selection.picks[i + 1..] {
                    prop_assert!((a.flight_time() - b.flight_time()).abs() >= spacing);
                }
            }
        }
    }

    #[test]
    fn picks_are_ranked_and_start_with_the_best(pool in goal_pool(), k in 1usize..8, spacing in 0.0f64..0.5) {
        let selection = select_diverse(&pool, k, spacing);
        for pair in selection.picks.windows(2) {
            prop_assert_ne!(compare_outcomes(&pair[0].outcome, &pair[1].outcome), Ordering::Greater);
        }
        if let Some(first) = selection.picks.first() {
            let best = pool
                .iter()
                .min_by(|a, b| compare_outcomes(&a.outcome, &b.outcome))
                .map(|c| c.outcome);
            prop_assert_eq!(Some(first.outcome), best);
        }
    }

    #[test]
    fn picks_come_from_the_pool(pool in goal_pool(), k in 1usize..8, spacing in 0.0f64..0.5) {
        let selection = select_diverse(&pool, k, spacing);
        for pick in &selection.picks {
            prop_assert!(pool.contains(pick));
        }
    }
}
