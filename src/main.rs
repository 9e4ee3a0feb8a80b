//! Scroll Quest entry point
//!
//! The browser build is driven from JS through `scroll_quest::web`. Natively
//! this runs a headless autoplay of the built-in journey: it scrolls forward
//! at a steady rate, logs every mode change and prints the final snapshot.
//!
//! Usage: `scroll-quest [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use scroll_quest::consts::*;
    use scroll_quest::sim::{RunPhase, Scenario};
    use scroll_quest::{Session, Tuning};

    env_logger::init();
    log::info!("Scroll Quest (native autoplay) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = args
        .next()
        .map(|path| Tuning::load(std::path::Path::new(&path)))
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2024);

    let mut session = Session::new(Scenario::nepal().with_tuning(tuning), seed);
    session.start();

    // Ten simulated minutes is far longer than a full journey
    let max_frames = (TICKS_PER_SECOND * 600.0) as u32;
    let mut mode = session.state().mode.kind();
    let mut last = None;
    for frame in 0..max_frames {
        if frame % 4 == 0 {
            session.wheel(100.0);
        }
        let snapshot = session.frame(SIM_DT);
        for event in &snapshot.events {
            log::debug!("t={:.2}s {:?}", snapshot.time, event);
        }
        if snapshot.mode != mode {
            log::info!(
                "t={:.2}s x={:.0} {:?} -> {:?}",
                snapshot.time,
                snapshot.player.pos.x,
                mode,
                snapshot.mode
            );
            mode = snapshot.mode;
        }
        let ended = snapshot.run == RunPhase::Ended;
        last = Some(snapshot);
        if ended {
            break;
        }
    }

    let Some(snapshot) = last else {
        return;
    };
    if snapshot.run != RunPhase::Ended {
        log::warn!("Autoplay stopped before the end at x={:.0}", snapshot.player.pos.x);
    }
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Cannot serialize final snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry points live in scroll_quest::web, this is just to satisfy the compiler
}
