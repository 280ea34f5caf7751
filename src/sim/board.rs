//! Static board layout
//!
//! Pegs and bins are generated once per board and never mutated; every ball
//! on the board reads the same shared layout. Rows stagger by half the
//! inter-peg spacing so the lattice packs triangularly, and the bin row
//! hangs one row gap below the last peg row.

use serde::{Deserialize, Serialize};

use crate::config::{BoardConfig, ConfigError};
use crate::fixed::{self, Fx};

/// Fixed circular collider in the falling field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peg {
    pub x: Fx,
    pub y: Fx,
    pub radius: Fx,
}

/// Payout slot at the bottom edge. `y` is the top edge of the bin row;
/// crossing it captures the ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub x: Fx,
    pub y: Fx,
    pub width: Fx,
    pub height: Fx,
    pub multiplier: f32,
    /// Fill color, 0xRRGGBB. Render data only.
    pub color: u32,
}

/// Payout steps from the center bin outward. Strictly non-decreasing, so
/// risk always grows toward the edges.
pub const MULTIPLIERS: [f32; 9] = [0.5, 1.0, 1.1, 1.2, 1.4, 2.0, 4.0, 9.0, 16.0];

/// Bin fill colors from the center outward (0xRRGGBB).
pub const BIN_COLORS: [u32; 9] = [
    0x4cc9f0, 0x4895ef, 0x4361ee, 0x3f37c9, 0x3a0ca3, 0x480ca8, 0x560bad, 0x7209b7, 0xb5179e,
];

/// The immutable playing field, entirely in scaled space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: Fx,
    height: Fx,
    ball_radius: Fx,
    /// Inter-peg spacing; also the bin width
    spacing: Fx,
    /// Top edge of the bin row
    bins_top: Fx,
    drop_y: Fx,
    default_drop_x: Fx,
    gravity: Fx,
    restitution: Fx,
    perturb: Fx,
    pulse_ticks: u64,
    pegs: Vec<Peg>,
    bins: Vec<Bin>,
}

impl Board {
    /// Build the static layout. Fails fast on configurations that could
    /// never capture a ball.
    pub fn new(cfg: &BoardConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let spacing = fixed::scale(cfg.width) / cfg.bin_count as Fx;
        let peg_radius = fixed::scale(cfg.peg_radius);
        let peg_top = fixed::scale(cfg.peg_top);
        let row_gap = fixed::scale(cfg.row_gap);

        // Row-major: top to bottom, left to right. Odd rows shift left by
        // half a spacing; every row carries bin_count - 1 pegs.
        let pegs_per_row = cfg.bin_count - 1;
        let mut pegs = Vec::with_capacity(cfg.row_count * pegs_per_row);
        for row in 0..cfg.row_count {
            let y = peg_top + row as Fx * row_gap;
            let shift = if row % 2 == 1 { spacing / 2 } else { 0 };
            for col in 0..pegs_per_row {
                let x = spacing * (col as Fx + 1) - shift;
                pegs.push(Peg {
                    x,
                    y,
                    radius: peg_radius,
                });
            }
        }

        let bins_top = peg_top + cfg.row_count as Fx * row_gap;
        let bins = (0..cfg.bin_count)
            .map(|i| Bin {
                x: spacing * i as Fx,
                y: bins_top,
                width: spacing,
                height: row_gap,
                multiplier: multiplier_for(i, cfg.bin_count),
                color: color_for(i, cfg.bin_count),
            })
            .collect();

        Ok(Self {
            width: fixed::scale(cfg.width),
            height: fixed::scale(cfg.height),
            ball_radius: fixed::scale(cfg.ball_radius),
            spacing,
            bins_top,
            drop_y: fixed::scale(cfg.drop_y),
            default_drop_x: fixed::scale(cfg.width / 2.0 + crate::consts::DROP_NUDGE),
            gravity: fixed::scale(cfg.gravity),
            restitution: fixed::scale(cfg.restitution),
            perturb: fixed::scale(cfg.perturb),
            pulse_ticks: u64::from(cfg.pulse_ms / cfg.tick_ms).max(1),
            pegs,
            bins,
        })
    }

    pub fn pegs(&self) -> &[Peg] {
        &self.pegs
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn width(&self) -> Fx {
        self.width
    }

    pub fn height(&self) -> Fx {
        self.height
    }

    pub fn ball_radius(&self) -> Fx {
        self.ball_radius
    }

    /// Top edge of the bin row; a ball whose bottom crosses it is captured.
    pub fn bins_top(&self) -> Fx {
        self.bins_top
    }

    pub fn drop_y(&self) -> Fx {
        self.drop_y
    }

    /// Drop point used when the caller supplies no offset.
    pub fn default_drop_x(&self) -> Fx {
        self.default_drop_x
    }

    pub fn gravity(&self) -> Fx {
        self.gravity
    }

    pub fn restitution(&self) -> Fx {
        self.restitution
    }

    pub fn perturb(&self) -> Fx {
        self.perturb
    }

    pub fn pulse_ticks(&self) -> u64 {
        self.pulse_ticks
    }

    /// Bin index owning horizontal position `x`, clamped at the extremes.
    /// A position exactly on a boundary belongs to the lower-indexed bin.
    pub fn bin_index_for_x(&self, x: Fx) -> usize {
        let i = ((x - 1).max(0) / self.spacing) as usize;
        i.min(self.bins.len() - 1)
    }

    /// Clamp a spawn offset into the playable width. Out-of-range offsets
    /// are corrected, never rejected: a game round must resolve to a bin.
    pub fn clamp_spawn_x(&self, x: Fx) -> Fx {
        x.clamp(self.ball_radius, self.width - self.ball_radius)
    }
}

fn multiplier_for(index: usize, count: usize) -> f32 {
    let distance = index.abs_diff(count / 2);
    MULTIPLIERS[distance.min(MULTIPLIERS.len() - 1)]
}

fn color_for(index: usize, count: usize) -> u32 {
    let distance = index.abs_diff(count / 2);
    BIN_COLORS[distance.min(BIN_COLORS.len() - 1)]
}
