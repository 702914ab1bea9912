//! Seraph's Arena entry point
//!
//! Natively this runs a headless demo: the autopilot plays one run at a
//! fixed frame rate, logs wave progress and submits the result to a local
//! leaderboard. The web build drives the library from its own host page.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use clap::{Parser, ValueEnum};

    use seraph_arena::audio::AudioManager;
    use seraph_arena::consts::FRAME_MS;
    use seraph_arena::sim::{
        FrameClock, GameEvent, GameMode, GamePhase, GameState, Hat, TickInput, Weapon, tick,
    };
    use seraph_arena::{LocalRanking, RankingService, Settings, Submission};

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum WeaponArg {
        Wizard,
        Emerald,
        Trident,
        Boom,
    }

    impl From<WeaponArg> for Weapon {
        fn from(arg: WeaponArg) -> Self {
            match arg {
                WeaponArg::Wizard => Weapon::Wizard,
                WeaponArg::Emerald => Weapon::Emerald,
                WeaponArg::Trident => Weapon::Trident,
                WeaponArg::Boom => Weapon::Boom,
            }
        }
    }

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum HatArg {
        Wizard,
        Helmet,
        Propeller,
        Challenger,
    }

    impl From<HatArg> for Hat {
        fn from(arg: HatArg) -> Self {
            match arg {
                HatArg::Wizard => Hat::Wizard,
                HatArg::Helmet => Hat::Helmet,
                HatArg::Propeller => Hat::Propeller,
                HatArg::Challenger => Hat::Challenger,
            }
        }
    }

    /// Headless autopilot run
    #[derive(Debug, Parser)]
    #[command(name = "seraph-arena", version)]
    struct Args {
        /// Run seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = WeaponArg::Wizard)]
        weapon: WeaponArg,

        #[arg(long, value_enum, default_value_t = HatArg::Wizard)]
        hat: HatArg,

        /// Start at wave 50 with the nightmare deck
        #[arg(long)]
        nightmare: bool,

        /// Stop after this many minutes of game time
        #[arg(long, default_value_t = 10.0)]
        minutes: f32,

        /// Name recorded on the leaderboard
        #[arg(long, default_value = "autopilot")]
        name: String,
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        let settings = Settings {
            weapon: args.weapon.into(),
            hat: args.hat.into(),
            mode: if args.nightmare {
                GameMode::Nightmare
            } else {
                GameMode::Standard
            },
            player_name: args.name.clone(),
            ..Settings::load()
        };
        let mut audio = AudioManager::new();
        audio.configure(&settings);

        let mut state = GameState::new(settings.setup(args.seed));
        let mut clock = FrameClock::new();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let frames = (args.minutes.max(0.0) * 60_000.0 / FRAME_MS) as u64;
        let mut summary = None;
        for frame in 0..frames {
            let dt = clock.advance(frame as f64 * FRAME_MS as f64);
            tick(&mut state, &input, dt);
            for event in state.drain_events() {
                match event {
                    GameEvent::Sound(sound) => audio.play(&sound),
                    GameEvent::LevelUp { level } => log::debug!("Level {level}"),
                    GameEvent::GameOver(run) => summary = Some(run),
                    _ => {}
                }
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        let hud = state.hud();
        let run = summary.unwrap_or_else(|| {
            log::info!("Time limit reached on wave {}", hud.wave);
            seraph_arena::sim::RunSummary::new(hud.score, hud.wave, hud.kills)
        });
        log::info!(
            "Final: score {} wave {} kills {} level {} cards {}",
            run.score,
            run.wave,
            run.kills,
            hud.level,
            hud.cards.len()
        );

        let mut ranking = LocalRanking::load();
        let mut submission = Submission::new();
        match submission.submit(
            &mut ranking,
            &settings.player_name,
            &run,
            state.setup.weapon,
            state.setup.hat,
        ) {
            Ok(()) => ranking.save(),
            Err(e) => log::warn!("Score not recorded: {e}"),
        }
        if let Ok(top) = ranking.top(10) {
            for (i, entry) in top.iter().enumerate() {
                println!("#{:<2} {:<20} {:>8}  wave {}", i + 1, entry.name, entry.score, entry.wave);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host links the library directly
}
