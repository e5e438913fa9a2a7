//! Game modes and their capabilities.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed set of game modes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum GameMode {
    /// Identify a blurred silhouette.
    Silhouette,
    /// Identify from the six base stats.
    StatRadar,
    /// Identify from flavor text with the name blanked out.
    RedactedDex,
    /// Identify from a sample of the move pool.
    MoveMaster,
    /// Spot the false statement among three.
    TwoTruths,
    /// Answer yes/no questions until the game names your creature.
    ReverseGuess,
    /// Identify as many silhouettes as possible before the clock runs out.
    SpeedRun,
}

impl GameMode {
    /// All modes in menu order.
    pub fn all() -> Vec<GameMode> {
        Self::iter().collect()
    }

    /// Human-readable mission title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Silhouette => "Who's That Creature?",
            Self::StatRadar => "Stat Radar",
            Self::RedactedDex => "Redacted Dex",
            Self::MoveMaster => "Move Master",
            Self::TwoTruths => "Two Truths",
            Self::ReverseGuess => "Reverse Guess",
            Self::SpeedRun => "Speed Run",
        }
    }

    /// Name of the badge unlocked by winning this mode.
    pub fn badge_name(self) -> &'static str {
        match self {
            Self::Silhouette => "Shadow Master",
            Self::StatRadar => "Stat Analyst",
            Self::RedactedDex => "Historian",
            Self::MoveMaster => "Combat Sage",
            Self::TwoTruths => "Truth Seeker",
            Self::ReverseGuess => "Neural Link",
            Self::SpeedRun => "Voltage Hero",
        }
    }

    /// Modes resolved by typing the creature's name.
    pub fn is_guess_driven(self) -> bool {
        match self {
            Self::Silhouette
            | Self::StatRadar
            | Self::RedactedDex
            | Self::MoveMaster
            | Self::SpeedRun => true,
            Self::TwoTruths | Self::ReverseGuess => false,
        }
    }

    /// Modes played against a countdown.
    pub fn is_timed(self) -> bool {
        matches!(self, Self::SpeedRun)
    }

    /// Modes in which hints can be bought.
    pub fn allows_hints(self) -> bool {
        !self.is_timed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case() {
        assert_eq!("speed-run".parse::<GameMode>().ok(), Some(GameMode::SpeedRun));
        assert_eq!("Redacted-Dex".parse::<GameMode>().ok(), Some(GameMode::RedactedDex));
        assert_eq!(GameMode::TwoTruths.to_string(), "two-truths");
    }

    #[test]
    fn only_speed_run_is_timed() {
        let timed: Vec<_> = GameMode::all().into_iter().filter(|m| m.is_timed()).collect();
        assert_eq!(timed, vec![GameMode::SpeedRun]);
        assert!(!GameMode::SpeedRun.allows_hints());
    }
}
