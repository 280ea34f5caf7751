//! Deterministic simulation module
//!
//! All engine logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only, one physics step per tick
//! - Scaled integer coordinates only; no floats in the physics path
//! - Seeded perturbation only, keyed by spawn offset
//! - No rendering or platform dependencies

pub mod board;
pub mod collision;
pub mod state;
pub mod tick;

pub use board::{BIN_COLORS, Bin, Board, MULTIPLIERS, Peg};
pub use collision::{Contact, bounce_jitter, contain_walls, find_contact, reflect_damped};
pub use state::{Ball, BallView, BinView, GameEvent, PegView, SimState};
pub use tick::{BallManager, CaptureHook, FixedFrames, TickSource, tick};
