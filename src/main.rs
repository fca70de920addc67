//! Hexpop headless driver
//!
//! Runs a bot through single-player stages, or a versus match between two
//! in-process sessions wired over channel links. Rendering and input belong
//! to the host; this binary only exercises the engine and logs what happens.
//!
//! Usage: `hexpop [solo [seed] | versus <passphrase>]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use hexpop::audio::NullAudio;
use hexpop::consts::{MAX_SUBSTEPS, SIM_DT};
use hexpop::net::{ChannelLink, inbox};
use hexpop::persistence::MemoryStore;
use hexpop::sim::{AnimationKind, GamePhase};
use hexpop::versus::MatchState;
use hexpop::{GameSession, Tuning, VersusSession};

/// Simulated host frame (60 Hz, two substeps each)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames before a demo gives up
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Fixed-timestep accumulator, as a host render loop would drive it
struct Clock {
    accumulator: f32,
}

impl Clock {
    fn new() -> Self {
        Self { accumulator: 0.0 }
    }

    /// Number of fixed steps owed for a frame of `dt` seconds
    fn steps(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

/// Random upward aim
fn bot_aim(rng: &mut Pcg32) -> Vec2 {
    Vec2::new(rng.random_range(-1.0..1.0), -1.0)
}

fn run_solo(seed: u64) {
    let mut session = GameSession::new(seed, Tuning::default(), NullAudio, MemoryStore::default());
    let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
    let mut clock = Clock::new();
    let (mut pops, mut drops) = (0, 0);

    session.start_new_game();
    for _ in 0..MAX_FRAMES {
        for _ in 0..clock.steps(FRAME_DT) {
            if session.active().is_none() {
                if let Some(board) = session.board() {
                    let origin = Vec2::new(board.abstract_width() / 2.0, session.game_over_line());
                    session.fire(bot_aim(&mut bot), origin);
                }
            }
            let report = session.tick(SIM_DT);
            pops += report.count(AnimationKind::Pop);
            drops += report.count(AnimationKind::Drop);
        }

        match session.phase() {
            GamePhase::StageCleared => {
                log::info!("Stage {} cleared, score {}", session.stage(), session.score());
                session.continue_to_next_stage();
            }
            GamePhase::GameOver => break,
            _ => {}
        }
    }

    println!(
        "solo: reached stage {} with {} points ({pops} popped, {drops} dropped)",
        session.stage(),
        session.score()
    );
    session.go_to_main_menu();
    println!("high score: {}", session.settings().high_score);
}

fn run_versus(passphrase: &str) {
    let (tx_a, inbox_a) = inbox();
    let (tx_b, inbox_b) = inbox();
    let mut players = [
        VersusSession::new(Tuning::default(), ChannelLink::new(tx_b), inbox_a, NullAudio),
        VersusSession::new(Tuning::default(), ChannelLink::new(tx_a), inbox_b, NullAudio),
    ];
    let mut bots = [Pcg32::seed_from_u64(1), Pcg32::seed_from_u64(2)];
    let mut clock = Clock::new();

    for player in &mut players {
        player.start_match(passphrase);
    }

    for _ in 0..MAX_FRAMES {
        for _ in 0..clock.steps(FRAME_DT) {
            for (player, bot) in players.iter_mut().zip(&mut bots) {
                if player.state() == MatchState::RoundInProgress && player.active().is_none() {
                    let origin = player
                        .board()
                        .map(|b| Vec2::new(b.abstract_width() / 2.0, player.game_over_line()));
                    if let Some(origin) = origin {
                        player.fire(bot_aim(bot), origin);
                    }
                }
                player.tick(SIM_DT);
            }
        }

        if players.iter().all(|p| p.state() == MatchState::MatchOver) {
            break;
        }
        if players.iter().any(|p| p.state() == MatchState::Disconnected) {
            log::warn!("Versus demo ended by disconnect");
            break;
        }
        for player in &mut players {
            if player.state() == MatchState::RoundOver {
                player.request_rematch();
            }
        }
    }

    println!(
        "versus: {}-{} after {} rounds",
        players[0].my_score(),
        players[0].opponent_score(),
        players[0].current_round()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hexpop (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("versus") => {
            let passphrase = args.get(1).map(String::as_str).unwrap_or("hexpop");
            run_versus(passphrase);
        }
        Some("solo") | None => {
            let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
            run_solo(seed);
        }
        Some(other) => {
            eprintln!("unknown mode '{other}', expected 'solo' or 'versus'");
            std::process::exit(2);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm host drives the library directly
}
