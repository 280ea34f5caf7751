//! Fixed-step simulation tick and the ball manager
//!
//! One tick advances every active ball exactly one physics step. The step
//! count is the only notion of time: gravity is per tick squared and never
//! derived from a wall clock, so a board replayed tick-for-tick lands
//! every ball in the same bin regardless of frame rate.

use crate::config::{BoardConfig, ConfigError};
use crate::fixed::{self, Fx};
use crate::sim::board::Board;
use crate::sim::collision;
use crate::sim::state::{Ball, GameEvent, SimState};

/// Outcome of a single ball step.
enum StepOutcome {
    Falling,
    Captured(usize),
}

/// Advance one ball by one tick: integrate, resolve at most one peg
/// contact, contain against the walls, then test for bin capture.
fn step_ball(ball: &mut Ball, board: &Board, events: &mut Vec<GameEvent>) -> StepOutcome {
    // Semi-implicit Euler: accelerate first, then move
    ball.vy += board.gravity();
    ball.x += ball.vx;
    ball.y += ball.vy;

    // First overlapping peg this tick, in row-major peg order
    if let Some(contact) = collision::find_contact(ball.x, ball.y, ball.radius, board.pegs()) {
        let peg = &board.pegs()[contact.peg_index];
        let approaching =
            fixed::fx_mul(ball.vx, contact.nx) + fixed::fx_mul(ball.vy, contact.ny) < 0;
        if approaching {
            let (vx, vy) = collision::reflect_damped(
                ball.vx,
                ball.vy,
                contact.nx,
                contact.ny,
                board.restitution(),
            );
            ball.vx = vx
                + collision::bounce_jitter(
                    ball.start_x,
                    contact.peg_index,
                    ball.bounces,
                    board.perturb(),
                );
            ball.vy = vy;
            ball.bounces += 1;
            events.push(GameEvent::PegHit {
                ball: ball.id,
                peg: contact.peg_index,
            });
            log::trace!("ball {} bounced off peg {}", ball.id, contact.peg_index);
        }
        // Rest the center just outside the collision radius either way,
        // so the next tick starts separated instead of stuck
        let r = ball.radius + peg.radius + collision::SKIN;
        ball.x = peg.x + fixed::fx_mul(contact.nx, r);
        ball.y = peg.y + fixed::fx_mul(contact.ny, r);
    }

    if collision::contain_walls(
        &mut ball.x,
        &mut ball.vx,
        ball.radius,
        board.width(),
        board.restitution(),
    ) {
        events.push(GameEvent::WallHit { ball: ball.id });
    }

    // Capture once the ball's bottom crosses the bin row's top edge
    if ball.y + ball.radius >= board.bins_top() {
        return StepOutcome::Captured(board.bin_index_for_x(ball.x));
    }
    StepOutcome::Falling
}

/// Advance the whole board by one tick. Captured balls are removed from
/// the active set and reported exactly once via a `Captured` event.
pub fn tick(state: &mut SimState) {
    state.time_ticks += 1;

    let board = &state.board;
    let balls = &mut state.balls;
    let events = &mut state.events;

    let mut captured: Vec<(u32, usize, Fx)> = Vec::new();
    balls.retain_mut(|ball| match step_ball(ball, board, events) {
        StepOutcome::Falling => true,
        StepOutcome::Captured(bin) => {
            captured.push((ball.id, bin, ball.start_x));
            false
        }
    });

    for (ball, bin, start_x) in captured {
        let multiplier = state.board.bins()[bin].multiplier;
        log::info!("ball {ball} captured by bin {bin} (x{multiplier})");
        state.arm_pulse(bin);
        state.events.push(GameEvent::Captured {
            ball,
            bin,
            start_x,
            multiplier,
        });
    }
}

/// Where frames come from. A real embedding wires this to its display
/// refresh callback; tests and the headless driver use [`FixedFrames`].
pub trait TickSource {
    /// Yield until the next frame is due; `false` ends the loop.
    fn next_frame(&mut self) -> bool;
}

/// Yields a fixed number of frames back to back.
#[derive(Debug, Clone, Copy)]
pub struct FixedFrames(pub u64);

impl TickSource for FixedFrames {
    fn next_frame(&mut self) -> bool {
        if self.0 == 0 {
            false
        } else {
            self.0 -= 1;
            true
        }
    }
}

/// Completion hook: `(bin index, original spawn offset)`.
pub type CaptureHook = Box<dyn FnMut(usize, Fx)>;

/// Owns the active ball set and the static board, drives the frame loop,
/// and raises one completion per captured ball.
pub struct BallManager {
    state: SimState,
    on_capture: Option<CaptureHook>,
    running: bool,
}

impl BallManager {
    pub fn new(cfg: &BoardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            state: SimState::new(Board::new(cfg)?),
            on_capture: None,
            running: true,
        })
    }

    /// Install the completion hook, fired exactly once per captured ball.
    pub fn set_capture_hook(&mut self, hook: CaptureHook) {
        self.on_capture = Some(hook);
    }

    /// Drop a ball at a display-space offset (board default when `None`).
    pub fn spawn(&mut self, start_x: Option<f32>) -> u32 {
        self.state.spawn(start_x)
    }

    /// Drop a ball at an already-scaled offset.
    pub fn spawn_scaled(&mut self, start_x: Fx) -> u32 {
        self.state.spawn_scaled(start_x)
    }

    /// Advance one frame. A stopped manager ignores the call.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let seen = self.state.events.len();
        tick(&mut self.state);
        if let Some(hook) = self.on_capture.as_mut() {
            for ev in &self.state.events[seen..] {
                if let GameEvent::Captured { bin, start_x, .. } = ev {
                    hook(*bin, *start_x);
                }
            }
        }
    }

    /// Drive the loop from a tick source until the source runs dry or the
    /// manager has been stopped.
    pub fn run<S: TickSource>(&mut self, frames: &mut S) {
        while self.running && frames.next_frame() {
            self.tick();
        }
    }

    /// Cancel the frame loop. Idempotent; no tick runs after it returns.
    /// In-flight balls are simply discarded with the manager, never
    /// persisted.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("simulation stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn balls_in_flight(&self) -> usize {
        self.state.balls.len()
    }

    /// Take everything observed since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Read-only simulation state for the renderer's per-frame pull.
    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }
}
