//! Star Raid headless driver
//!
//! Flies a full run on autopilot against a manual clock and records the
//! result in the high-score table.
//!
//! Usage: `star-raid [settings.json] [highscores.json] [max_frames]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use star_raid::audio::LogAudio;
    use star_raid::consts::{FIELD_HEIGHT, FIELD_WIDTH, FRAME_MS};
    use star_raid::platform::{Clock, InputState, Key, ManualClock};
    use star_raid::sim::GamePhase;
    use star_raid::{Game, HighScores, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Star Raid (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    log::info!(
        "Quality {} | particles {} | lives {}",
        settings.quality.as_str(),
        settings.particles,
        settings.starting_lives
    );
    let scores_path = args.next().unwrap_or_else(|| "highscores.json".to_string());
    let max_frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(36_000);

    let scores = HighScores::load_or_default(&scores_path);
    let mut game = Game::with_sinks(settings, LogAudio::new(), scores);

    let mut clock = ManualClock::new(0);
    let mut input = InputState::new();
    input.key_down(Key::Autopilot);

    game.start_game(clock.now_ms());
    let mut last_level = game.level();

    for _ in 0..max_frames {
        clock.advance(FRAME_MS);
        let intents = input.sample(FIELD_WIDTH, FIELD_HEIGHT);
        game.advance(&intents, clock.now_ms());

        if game.level() != last_level {
            last_level = game.level();
            log::info!(
                "Reached level {} | score {} | lives {}",
                last_level,
                game.score(),
                game.lives()
            );
        }
        if game.phase() == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Run finished after {} ms of game time: score {}, level {}, phase {:?}",
        game.state().clock_ms,
        game.score(),
        game.level(),
        game.phase()
    );

    for (i, entry) in game.persistence().entries.iter().enumerate() {
        log::info!("#{:>2} {:>8}  level {}", i + 1, entry.score, entry.level);
    }

    if let Err(e) = game.persistence().save(&scores_path) {
        log::error!("Failed to save high scores: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `Game` directly through the library
}
