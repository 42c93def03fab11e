//! Scoring module - points for removal waves
//!
//! A turn removes balloons in one or more waves (the swap itself, then any
//! cascades). Each wave is scored on its own size under the session's
//! [`ScorePolicy`], so a squared policy rewards one large wave over several
//! small ones.

use crate::matching::MatchSet;
use crate::types::ScorePolicy;

/// Score calculation result for a whole turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points per wave, in resolution order
    pub wave_scores: Vec<u32>,
    pub removed: usize,
    pub total: u32,
}

/// Points for one wave of `removed` balloons
pub fn calculate_wave_score(policy: ScorePolicy, removed: usize) -> u32 {
    policy.points(removed)
}

/// Score every wave of a turn and add them up (saturating)
pub fn calculate_turn_score(policy: ScorePolicy, waves: &[MatchSet]) -> ScoreResult {
    let wave_scores: Vec<u32> = waves
        .iter()
        .map(|w| calculate_wave_score(policy, w.len()))
        .collect();
    let total = wave_scores.iter().fold(0u32, |acc, s| acc.saturating_add(*s));

    ScoreResult {
        removed: waves.iter().map(MatchSet::len).sum(),
        wave_scores,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn wave(n: u8) -> MatchSet {
        (0..n).map(|c| Position::new(0, c)).collect()
    }

    #[test]
    fn test_squared_policy() {
        assert_eq!(calculate_wave_score(ScorePolicy::Squared, 3), 9);
        assert_eq!(calculate_wave_score(ScorePolicy::Squared, 0), 0);
    }

    #[test]
    fn test_linear_policy() {
        let p = ScorePolicy::Linear {
            points_per_piece: 10,
        };
        assert_eq!(calculate_wave_score(p, 3), 30);
        assert_eq!(calculate_wave_score(p, 5), 50);
    }

    #[test]
    fn test_turn_scores_each_wave_separately() {
        let result = calculate_turn_score(ScorePolicy::Squared, &[wave(3), wave(4)]);
        assert_eq!(result.wave_scores, vec![9, 16]);
        assert_eq!(result.total, 25);
        assert_eq!(result.removed, 7);
    }

    #[test]
    fn test_turn_score_saturates() {
        let p = ScorePolicy::Linear {
            points_per_piece: u32::MAX,
        };
        let result = calculate_turn_score(p, &[wave(3), wave(3)]);
        assert_eq!(result.total, u32::MAX);
    }
}
