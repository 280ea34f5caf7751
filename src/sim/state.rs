//! Simulation state and capture bookkeeping
//!
//! All mutable state lives here, owned by the manager and touched only
//! from the tick path. The board itself is immutable and shared by every
//! ball. View accessors unscale on the way out; nothing else ever leaves
//! fixed-point space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::fixed::{self, Fx};
use crate::sim::board::Board;

/// An active ball. Positions and velocities are in scaled space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub x: Fx,
    pub y: Fx,
    pub vx: Fx,
    pub vy: Fx,
    pub radius: Fx,
    /// 0xRRGGBB, render data only
    pub color: u32,
    /// Spawn offset exactly as supplied by the outcome provider, echoed on
    /// capture so the caller can correlate with its bet
    pub start_x: Fx,
    /// Peg bounces so far; keys the perturbation stream
    pub bounces: u32,
}

/// Observable things a tick produced. Drained by the embedding layer;
/// `Captured` carries the payout multiplier so a consumer can settle the
/// bet without re-querying the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PegHit { ball: u32, peg: usize },
    WallHit { ball: u32 },
    Captured {
        ball: u32,
        bin: usize,
        start_x: Fx,
        multiplier: f32,
    },
}

/// Complete simulation state (deterministic, serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub board: Board,
    /// Active balls in spawn order. Never reordered; balls do not interact,
    /// so tick order among them cannot matter.
    pub balls: Vec<Ball>,
    /// Events since the last drain.
    pub events: Vec<GameEvent>,
    /// Simulation tick counter; the only clock the engine knows.
    pub time_ticks: u64,
    /// Capture pulse start tick per bin. A new capture overwrites the slot;
    /// pulses never stack.
    pulses: Vec<Option<u64>>,
    next_id: u32,
}

impl SimState {
    pub fn new(board: Board) -> Self {
        let pulses = vec![None; board.bins().len()];
        Self {
            board,
            balls: Vec::new(),
            events: Vec::new(),
            time_ticks: 0,
            pulses,
            next_id: 1,
        }
    }

    /// Drop a ball at the given display-space offset, or at the board's
    /// default drop point. Returns the ball id.
    pub fn spawn(&mut self, start_x: Option<f32>) -> u32 {
        let x = start_x
            .map(fixed::scale)
            .unwrap_or_else(|| self.board.default_drop_x());
        self.spawn_scaled(x)
    }

    /// Drop a ball at an already-scaled offset. Offsets outside the board
    /// are clamped into range; the capture event still echoes the original.
    pub fn spawn_scaled(&mut self, start_x: Fx) -> u32 {
        let x = self.board.clamp_spawn_x(start_x);
        let id = self.next_id;
        self.next_id += 1;
        self.balls.push(Ball {
            id,
            x,
            y: self.board.drop_y(),
            vx: 0,
            vy: 0,
            radius: self.board.ball_radius(),
            color: consts::BALL_COLOR,
            start_x,
            bounces: 0,
        });
        log::debug!("ball {id} spawned at x={}", fixed::unscale(x));
        id
    }

    /// Take everything observed since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn arm_pulse(&mut self, bin: usize) {
        if let Some(slot) = self.pulses.get_mut(bin) {
            *slot = Some(self.time_ticks);
        }
    }

    /// Capture pulse progress for a bin in `[0, 1)`, or `None` once the
    /// pulse has run its course. Expiry is judged lazily against the tick
    /// counter; no timer exists anywhere.
    pub fn pulse_progress(&self, bin: usize) -> Option<f32> {
        let start = self.pulses.get(bin).copied().flatten()?;
        let elapsed = self.time_ticks.saturating_sub(start);
        let duration = self.board.pulse_ticks();
        if elapsed >= duration {
            None
        } else {
            Some(elapsed as f32 / duration as f32)
        }
    }

    pub fn peg_views(&self) -> Vec<PegView> {
        self.board
            .pegs()
            .iter()
            .map(|p| PegView {
                pos: Vec2::new(fixed::unscale(p.x), fixed::unscale(p.y)),
                radius: fixed::unscale(p.radius),
            })
            .collect()
    }

    pub fn bin_views(&self) -> Vec<BinView> {
        self.board
            .bins()
            .iter()
            .enumerate()
            .map(|(i, b)| BinView {
                index: i,
                pos: Vec2::new(fixed::unscale(b.x), fixed::unscale(b.y)),
                width: fixed::unscale(b.width),
                height: fixed::unscale(b.height),
                multiplier: b.multiplier,
                color: b.color,
                pulse: self.pulse_progress(i),
            })
            .collect()
    }

    pub fn ball_views(&self) -> Vec<BallView> {
        self.balls
            .iter()
            .map(|b| BallView {
                id: b.id,
                pos: Vec2::new(fixed::unscale(b.x), fixed::unscale(b.y)),
                radius: fixed::unscale(b.radius),
                color: b.color,
            })
            .collect()
    }
}

/// Render view of a peg, unscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PegView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Render view of a bin, unscaled. `pos` is the top-left corner; `pulse`
/// is the capture animation progress, if one is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinView {
    pub index: usize,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub multiplier: f32,
    pub color: u32,
    pub pulse: Option<f32>,
}

/// Render view of a ball, unscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
}
