//! Headless board driver
//!
//! Drops a handful of balls and reports where they land. Stands in for the
//! out-of-scope game client while exercising the whole engine surface:
//! spawn, tick source, capture hook, and the render-query views.

use plinko_drop::fixed;
use plinko_drop::sim::{FixedFrames, TickSource};
use plinko_drop::{BallManager, BoardConfig};

fn main() {
    env_logger::init();

    let cfg = BoardConfig::default();
    let mut manager = match BallManager::new(&cfg) {
        Ok(m) => m,
        Err(err) => {
            log::error!("bad board configuration: {err}");
            std::process::exit(1);
        }
    };

    manager.set_capture_hook(Box::new(|bin, start_x| {
        println!(
            "dropped at {:>7.2} -> bin {bin:>2}",
            fixed::unscale(start_x)
        );
    }));

    // Offsets from the command line, or a sweep across the middle
    let drops: Vec<f32> = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.parse().ok())
        .collect();
    if drops.is_empty() {
        for k in 0..7 {
            manager.spawn(Some(cfg.width * (0.2 + 0.1 * k as f32)));
        }
    } else {
        for x in drops {
            manager.spawn(Some(x));
        }
    }

    let mut frames = FixedFrames(20_000);
    while manager.is_running() && manager.balls_in_flight() > 0 && frames.next_frame() {
        manager.tick();
        // Keep the event backlog flat; the hook already reported landings
        for event in manager.drain_events() {
            log::trace!("{event:?}");
        }
    }
    if manager.balls_in_flight() > 0 {
        log::warn!("frame budget exhausted with balls still falling");
    }

    let bins = manager.state().bin_views();
    let line: Vec<String> = bins.iter().map(|b| format!("x{}", b.multiplier)).collect();
    println!("bins: {}", line.join(" "));

    manager.stop();
}
