//! Scoring formulas and round budgets.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    /// Score before deductions.
    pub base_score: u32,
    /// Deduction per hint bought.
    pub hint_penalty: u32,
    /// Minimum score of a won non-timed round.
    pub score_floor: u32,
    /// Hints purchasable per round.
    pub clue_budget: u8,
    /// Questions asked before elimination mode gives up.
    pub question_budget: usize,
    /// Failed guesses after which wrong guesses are taunted instead of compared.
    pub taunt_threshold: u32,
    /// Length of a speed run, in seconds.
    pub speed_run_seconds: u32,
    /// Points per creature identified in a speed run.
    pub points_per_identification: u32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            base_score: 1000,
            hint_penalty: 150,
            score_floor: 100,
            clue_budget: 5,
            question_budget: 15,
            taunt_threshold: 2,
            speed_run_seconds: 60,
            points_per_identification: 200,
        }
    }
}

impl RoundRules {
    /// `max(floor, base - hints * penalty - floor(seconds))`.
    pub fn score(&self, hints_used: u8, elapsed: Duration) -> u32 {
        let deductions = u64::from(hints_used) * u64::from(self.hint_penalty) + elapsed.as_secs();
        let raw = u64::from(self.base_score).saturating_sub(deductions);
        u32::try_from(raw).unwrap_or(u32::MAX).max(self.score_floor)
    }

    /// Speed run score: uncapped, linear in identifications.
    pub fn timed_score(&self, identified: u32) -> u32 {
        identified.saturating_mul(self.points_per_identification)
    }
}

/// Image filter levels for silhouette clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obscurity {
    /// Blur radius in pixels.
    pub blur: u32,
    /// Brightness percentage.
    pub brightness: u32,
    /// Contrast percentage.
    pub contrast: u32,
}

impl Obscurity {
    /// Unobscured image.
    pub const CLEAR: Obscurity = Obscurity {
        blur: 0,
        brightness: 100,
        contrast: 100,
    };

    /// Filter levels after `hints_used` hints; each hint lifts the shadow a little.
    pub fn for_hints(hints_used: u8) -> Self {
        let h = u32::from(hints_used);
        Self {
            blur: 15u32.saturating_sub(h * 3),
            brightness: (h * 8).min(30),
            contrast: (h * 15).min(40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obscurity_lifts_with_hints() {
        assert_eq!(Obscurity::for_hints(0), Obscurity { blur: 15, brightness: 0, contrast: 0 });
        assert_eq!(Obscurity::for_hints(5), Obscurity { blur: 0, brightness: 30, contrast: 40 });
    }

    #[test]
    fn score_saturates_at_floor() {
        let rules = RoundRules::default();
        assert_eq!(rules.score(5, Duration::from_secs(100_000)), 100);
    }

    #[test]
    fn score_never_drops_below_floor() {
        let rules = RoundRules::default();
        for hints in 0..=rules.clue_budget {
            for secs in [0, 1, 59, 250, 999, 1_000, 86_400] {
                let score = rules.score(hints, Duration::from_secs(secs));
                assert!(score >= rules.score_floor, "hints={} secs={}", hints, secs);
                assert!(score <= rules.base_score);
            }
        }
        assert_eq!(rules.score(0, Duration::from_millis(999)), 1000);
        assert_eq!(rules.score(4, Duration::from_secs(350)), 100);
    }
}
