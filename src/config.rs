//! Board configuration
//!
//! Everything the layout generator and the physics step read is fixed here
//! at construction time; a built board never changes shape. Misconfigured
//! boards are programmer errors and are rejected before a single ball is
//! dropped — a board whose bins a ball can never reach would tick forever.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// Rejected configurations.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("restitution must be in (0, 1), got {0}")]
    RestitutionOutOfRange(f32),
    #[error("perturbation must not be negative, got {0}")]
    NegativePerturb(f32),
    #[error("bin count must be at least 2, got {0}")]
    TooFewBins(usize),
    #[error("ball diameter {ball} does not fit the {gap} gap between pegs")]
    BallTooLarge { ball: f32, gap: f32 },
    #[error("bin row ends at {bottom} but the board is only {height} tall")]
    BinsOutOfBounds { bottom: f32, height: f32 },
}

/// Full configuration surface. Immutable once a board is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    /// Peg rows in the staggered lattice
    pub row_count: usize,
    /// Payout slots along the bottom edge; pegs per row is one fewer
    pub bin_count: usize,
    /// Vertical gap between peg rows; horizontal spacing is width / bin_count
    pub row_gap: f32,
    /// Y of the first peg row
    pub peg_top: f32,
    /// Y at which balls enter the board
    pub drop_y: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Velocity fraction kept normal to a collision
    pub restitution: f32,
    /// Horizontal perturbation ceiling per bounce; zero disables it
    pub perturb: f32,
    /// Fixed tick duration in milliseconds; converts pulse_ms to ticks
    pub tick_ms: u32,
    /// Capture pulse duration in milliseconds
    pub pulse_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: consts::BOARD_WIDTH,
            height: consts::BOARD_HEIGHT,
            ball_radius: consts::BALL_RADIUS,
            peg_radius: consts::PEG_RADIUS,
            row_count: consts::ROW_COUNT,
            bin_count: consts::BIN_COUNT,
            row_gap: consts::ROW_GAP,
            peg_top: consts::PEG_TOP,
            drop_y: consts::DROP_Y,
            gravity: consts::GRAVITY,
            restitution: consts::RESTITUTION,
            perturb: consts::PERTURB,
            tick_ms: consts::TICK_MS,
            pulse_ms: consts::PULSE_MS,
        }
    }
}

impl BoardConfig {
    /// Fail fast on configurations the physics layer cannot make sense of.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("width", self.width),
            ("height", self.height),
            ("ball radius", self.ball_radius),
            ("peg radius", self.peg_radius),
            ("row gap", self.row_gap),
            ("first row height", self.peg_top),
            ("drop height", self.drop_y),
            ("gravity", self.gravity),
        ];
        for (name, v) in positives {
            if v <= 0.0 {
                return Err(ConfigError::NonPositive(name));
            }
        }
        if self.row_count == 0 {
            return Err(ConfigError::NonPositive("row count"));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::NonPositive("tick duration"));
        }
        if self.bin_count < 2 {
            return Err(ConfigError::TooFewBins(self.bin_count));
        }
        if !(self.restitution > 0.0 && self.restitution < 1.0) {
            return Err(ConfigError::RestitutionOutOfRange(self.restitution));
        }
        if self.perturb < 0.0 {
            return Err(ConfigError::NegativePerturb(self.perturb));
        }

        // A ball must fit through the clear gap between adjacent pegs
        let spacing = self.width / self.bin_count as f32;
        let gap = spacing - 2.0 * self.peg_radius;
        if gap <= 2.0 * self.ball_radius {
            return Err(ConfigError::BallTooLarge {
                ball: 2.0 * self.ball_radius,
                gap,
            });
        }

        // The bin row must sit on the board, below the last peg row
        let bottom = self.peg_top + (self.row_count as f32 + 1.0) * self.row_gap;
        if bottom > self.height {
            return Err(ConfigError::BinsOutOfBounds {
                bottom,
                height: self.height,
            });
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(BoardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let cfg = BoardConfig {
            peg_radius: 0.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositive("peg radius")));

        let cfg = BoardConfig {
            gravity: -0.1,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositive("gravity")));
    }

    #[test]
    fn test_rejects_single_bin() {
        let cfg = BoardConfig {
            bin_count: 1,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TooFewBins(1)));
    }

    #[test]
    fn test_rejects_restitution_of_one() {
        // At restitution 1 collisions never shed energy and a ball can
        // bounce forever
        let cfg = BoardConfig {
            restitution: 1.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::RestitutionOutOfRange(1.0)));
    }

    #[test]
    fn test_rejects_ball_wider_than_peg_gap() {
        let cfg = BoardConfig {
            ball_radius: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BallTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_bins_past_board_bottom() {
        let cfg = BoardConfig {
            height: 300.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BinsOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = BoardConfig {
            bin_count: 9,
            gravity: 0.3,
            ..Default::default()
        };
        let json = cfg.to_json().unwrap();
        assert_eq!(BoardConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg = BoardConfig::from_json(r#"{"bin_count": 5}"#).unwrap();
        assert_eq!(cfg.bin_count, 5);
        assert_eq!(cfg.width, BoardConfig::default().width);
    }
}
