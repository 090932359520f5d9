use crate::behavior::aim::AimStrategy;
use common::RaceStanding;
use derive_new::new;
use std::{error::Error, fmt, str::FromStr};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Best,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "novice" => Ok(Difficulty::Easy),
            "medium" | "intermediate" => Ok(Difficulty::Medium),
            "hard" | "expert" => Ok(Difficulty::Hard),
            "best" | "supertux" => Ok(Difficulty::Best),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseDifficultyError(String);

impl fmt::Display for ParseDifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown difficulty {:?}, expected easy, medium, hard or best",
            self.0,
        )
    }
}

impl Error for ParseDifficultyError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NitroUsage {
    None,
    /// Only with a well filled tank, or on the last lap.
    Some,
    All,
}

/// A probability that scales with the race position: `leader` applies to the
/// kart in front, `last` to the kart at the back, linear in between.
#[derive(new, Copy, Clone, Debug, PartialEq)]
pub struct StandingProbability {
    pub leader: f32,
    pub last: f32,
}

impl StandingProbability {
    pub fn constant(p: f32) -> Self {
        Self::new(p, p)
    }

    pub fn get(&self, standing: &RaceStanding) -> f32 {
        let t = standing.fraction_behind();
        self.leader + (self.last - self.leader) * t
    }
}

/// Per-difficulty tuning of the driving AI.
#[derive(Clone, Debug)]
pub struct AiProperties {
    pub difficulty: Difficulty,
    pub aim_strategy: AimStrategy,
    /// Seconds to move the steering from center to full lock.
    pub time_full_steer: f32,
    pub skidding_probability: StandingProbability,
    pub collect_item_probability: StandingProbability,
    /// Collectibles further off the aim direction than this are ignored.
    pub max_item_angle: f32,
    /// Replaces `max_item_angle` above `high_speed_fraction` of max speed.
    pub max_item_angle_high_speed: f32,
    pub high_speed_fraction: f32,
    pub nitro_usage: NitroUsage,
    /// Drive into other karts' slipstream instead of around them.
    pub use_slipstream: bool,
    /// Reaction time at the start, drawn uniformly from this range.
    pub min_start_delay: f32,
    pub max_start_delay: f32,
    /// Seeds every random decision of the AI (combined with the kart id).
    pub seed: u64,
}

impl AiProperties {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let base = Self {
            difficulty,
            aim_strategy: AimStrategy::SharpTurnAware,
            time_full_steer: 0.1,
            skidding_probability: StandingProbability::constant(1.0),
            collect_item_probability: StandingProbability::constant(1.0),
            max_item_angle: 0.7,
            max_item_angle_high_speed: 1.0,
            high_speed_fraction: 0.8,
            nitro_usage: NitroUsage::All,
            use_slipstream: true,
            min_start_delay: 0.1,
            max_start_delay: 0.15,
            seed: 0,
        };

        match difficulty {
            Difficulty::Easy => Self {
                aim_strategy: AimStrategy::Fixed,
                time_full_steer: 0.4,
                skidding_probability: StandingProbability::new(0.1, 0.3),
                collect_item_probability: StandingProbability::new(0.2, 0.5),
                nitro_usage: NitroUsage::None,
                use_slipstream: false,
                min_start_delay: 0.25,
                max_start_delay: 0.5,
                ..base
            },
            Difficulty::Medium => Self {
                time_full_steer: 0.2,
                skidding_probability: StandingProbability::new(0.5, 0.7),
                collect_item_probability: StandingProbability::new(0.5, 0.8),
                nitro_usage: NitroUsage::Some,
                min_start_delay: 0.15,
                max_start_delay: 0.28,
                ..base
            },
            Difficulty::Hard => Self {
                skidding_probability: StandingProbability::new(0.9, 1.0),
                collect_item_probability: StandingProbability::new(0.9, 1.0),
                min_start_delay: 0.12,
                max_start_delay: 0.2,
                ..base
            },
            Difficulty::Best => Self {
                aim_strategy: AimStrategy::Localized,
                ..base
            },
        }
    }

    pub fn with_aim_strategy(mut self, aim_strategy: AimStrategy) -> Self {
        self.aim_strategy = aim_strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_start_delay(mut self, min: f32, max: f32) -> Self {
        self.min_start_delay = min;
        self.max_start_delay = max.max(min);
        self
    }

    pub fn with_nitro_usage(mut self, nitro_usage: NitroUsage) -> Self {
        self.nitro_usage = nitro_usage;
        self
    }

    pub fn with_collect_item_probability(mut self, probability: StandingProbability) -> Self {
        self.collect_item_probability = probability;
        self
    }

    pub fn with_slipstream(mut self, use_slipstream: bool) -> Self {
        self.use_slipstream = use_slipstream;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_difficulty() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("supertux".parse::<Difficulty>(), Ok(Difficulty::Best));
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn probability_follows_standing() {
        let p = StandingProbability::new(0.2, 0.6);
        let mut standing = RaceStanding {
            num_karts: 3,
            ..Default::default()
        };
        assert_abs_diff_eq!(p.get(&standing), 0.2);
        standing.position = 2;
        assert_abs_diff_eq!(p.get(&standing), 0.4);
        standing.position = 3;
        assert_abs_diff_eq!(p.get(&standing), 0.6);
    }

    #[test]
    fn easier_karts_steer_slower() {
        let easy = AiProperties::for_difficulty(Difficulty::Easy);
        let best = AiProperties::for_difficulty(Difficulty::Best);
        assert!(easy.time_full_steer > best.time_full_steer);
        assert_eq!(easy.nitro_usage, NitroUsage::None);
        assert_eq!(best.aim_strategy, AimStrategy::Localized);
    }
}
