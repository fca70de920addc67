//! Single-player game session
//!
//! Drives one run: stage setup, the ammo stream, the projectile, ceiling
//! pressure and scoring. The board is a passive collaborator; audio and
//! settings storage are injected.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, SoundEffect};
use crate::consts::{BASE_MAX_TIME, STAGE_CLEAR_BONUS};
use crate::persistence::{SavedBubble, SavedGame, SettingsStore};
use crate::settings::Settings;
use crate::sim::{
    AnimationKind, Board, Bubble, BubbleKind, ClearResult, GamePhase, ShotCounters, TextCue,
    TickReport, draw_ammo, step_projectile,
};
use crate::tuning::Tuning;
use crate::{aim_direction, game_over_line};

/// Text colours (ABGR)
const POP_TEXT_COLOR: u32 = 0xFFFFFFFF;
const DROP_TEXT_COLOR: u32 = 0xFF1AD3D3;
const COMBO_TEXT_COLOR: u32 = 0xFF00A5FF;
const HELPER_TEXT_COLOR: u32 = 0xFFC000C0;
const CHEST_TEXT_COLOR: u32 = 0xFF00D4FF;

/// Number of bonus tracks hidden in chests
pub const BONUS_TRACKS: u32 = 5;

/// Shots allowed between ceiling advances
pub fn max_shots_for_stage(stage: u32) -> u32 {
    match stage {
        50.. => 1,
        40.. => 2,
        30.. => 3,
        20.. => 5,
        _ => 8,
    }
}

/// Seconds allowed between ceiling advances
pub fn max_time_for_stage(stage: u32) -> f32 {
    match stage {
        20.. => 10.0,
        15.. => 20.0,
        _ => BASE_MAX_TIME - (stage.saturating_sub(1) / 2) as f32 * 0.5,
    }
}

pub struct GameSession<A: AudioSink, S: SettingsStore> {
    phase: GamePhase,
    stage: u32,
    score: u32,
    shots_until_drop: u32,
    time_until_drop: f32,
    max_time: f32,
    /// Sticky for the rest of the stage once unlocked
    helper_line_active: bool,
    board: Option<Board>,
    active: Option<Bubble>,
    next: Option<Bubble>,
    counters: ShotCounters,
    game_over_line: f32,
    /// Ammo and board seeds
    rng: Pcg32,
    report: TickReport,
    tuning: Tuning,
    settings: Settings,
    audio: A,
    store: S,
}

impl<A: AudioSink, S: SettingsStore> GameSession<A, S> {
    pub fn new(seed: u64, tuning: Tuning, audio: A, store: S) -> Self {
        let settings = Settings::load(&store);
        Self {
            phase: GamePhase::MainMenu,
            stage: 1,
            score: 0,
            shots_until_drop: 0,
            time_until_drop: 0.0,
            max_time: BASE_MAX_TIME,
            helper_line_active: false,
            board: None,
            active: None,
            next: None,
            counters: ShotCounters::default(),
            game_over_line: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            report: TickReport::default(),
            tuning,
            settings,
            audio,
            store,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn shots_until_drop(&self) -> u32 {
        self.shots_until_drop
    }

    pub fn time_until_drop(&self) -> f32 {
        self.time_until_drop
    }

    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    pub fn helper_line_active(&self) -> bool {
        self.helper_line_active
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Projectile in flight
    pub fn active(&self) -> Option<&Bubble> {
        self.active.as_ref()
    }

    /// Loaded ammo
    pub fn next(&self) -> Option<&Bubble> {
        self.next.as_ref()
    }

    pub fn counters(&self) -> &ShotCounters {
        &self.counters
    }

    /// Y at which a bubble's lower edge ends the run
    pub fn game_over_line(&self) -> f32 {
        self.game_over_line
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn start_new_game(&mut self) {
        self.score = 0;
        self.stage = 1;
        self.setup_stage();
        self.audio.start_playlist();
        self.phase = GamePhase::InGame;
        self.clear_saved_game();
        log::info!("New game started");
    }

    /// Resume the saved game, if there is one
    pub fn continue_game(&mut self) -> bool {
        let Some(saved) = self.settings.saved_game.clone() else {
            return false;
        };
        self.load_state(&saved);
        self.audio.start_playlist();
        self.phase = GamePhase::InGame;
        log::info!("Continuing saved game at stage {}", self.stage);
        true
    }

    pub fn go_to_main_menu(&mut self) {
        if self.settings.record_high_score(self.score) {
            log::info!("New high score: {}", self.score);
            self.settings.save(&mut self.store);
        }
        self.phase = GamePhase::MainMenu;
    }

    /// Move on after a cleared stage
    pub fn continue_to_next_stage(&mut self) -> bool {
        if self.phase != GamePhase::StageCleared {
            return false;
        }
        self.stage += 1;
        self.setup_stage();
        self.phase = GamePhase::InGame;
        log::info!("Stage {} started", self.stage);
        true
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::InGame {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::InGame;
        }
    }

    fn setup_stage(&mut self) {
        self.helper_line_active = self.stage <= 2;

        let board = Board::single_player(self.stage, self.rng.random());
        self.game_over_line = game_over_line(board.abstract_width());
        self.board = Some(board);

        self.shots_until_drop = max_shots_for_stage(self.stage);
        self.counters = ShotCounters::default();
        self.max_time = max_time_for_stage(self.stage);
        self.time_until_drop = self.max_time;
        self.active = None;
        self.report = TickReport::default();
        self.next = self.create_ammo();
    }

    fn create_ammo(&mut self) -> Option<Bubble> {
        let board = self.board.as_mut()?;
        let kind = draw_ammo(
            &self.tuning.ammo,
            &mut self.counters,
            self.stage,
            &board.colors_on_board(),
            board.allowed_colors(),
            &mut self.rng,
        );
        Some(board.mint(kind, Vec2::ZERO))
    }

    /// Launch the loaded bubble
    ///
    /// Ignored outside play or while a projectile is still in flight.
    pub fn fire(&mut self, direction: Vec2, origin: Vec2) -> bool {
        if self.phase != GamePhase::InGame || self.active.is_some() {
            return false;
        }
        let Some(dir) = aim_direction(direction) else {
            return false;
        };
        let Some(mut bubble) = self.next.take() else {
            return false;
        };
        self.audio.play(SoundEffect::Fire);

        bubble.pos = origin;
        bubble.vel = dir * self.tuning.projectile_speed;
        self.counters.record_shot(bubble.kind);
        self.active = Some(bubble);
        self.next = self.create_ammo();

        self.shots_until_drop = self.shots_until_drop.saturating_sub(1);
        self.time_until_drop = self.max_time;
        if self.shots_until_drop == 0 {
            self.advance_ceiling();
            self.shots_until_drop = max_shots_for_stage(self.stage);
        }
        true
    }

    /// Advance the session by `dt` seconds and return what happened
    pub fn tick(&mut self, dt: f32) -> TickReport {
        if self.phase == GamePhase::InGame && self.board.is_some() {
            self.update_timers(dt);
            self.update_active(dt);

            let topped_out = self
                .board
                .as_ref()
                .is_some_and(|b| b.reaches(self.game_over_line));
            if self.phase == GamePhase::InGame && topped_out {
                log::info!("Game over at stage {} with {} points", self.stage, self.score);
                self.phase = GamePhase::GameOver;
                self.clear_saved_game();
            }
        }
        std::mem::take(&mut self.report)
    }

    fn update_timers(&mut self, dt: f32) {
        self.time_until_drop -= dt;
        if self.time_until_drop <= 0.0 {
            self.advance_ceiling();
            self.time_until_drop = self.max_time;
            self.shots_until_drop = max_shots_for_stage(self.stage);
        }
    }

    fn update_active(&mut self, dt: f32) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let Some(board) = self.board.as_mut() else {
            return;
        };

        if step_projectile(&mut active, dt, board.abstract_width()).is_some() {
            self.audio.play(SoundEffect::Bounce);
        }

        match board.find_collision(&active) {
            Some(contact) => {
                self.audio.play(SoundEffect::Land);
                let result = board.resolve_landing(active, contact);
                self.handle_clear_result(result);
            }
            None => self.active = Some(active),
        }
    }

    /// Lower the ceiling; dislodged bombs detonate, other drops are not scored
    fn advance_ceiling(&mut self) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        let dropped = board.advance_ceiling();
        self.audio.play(SoundEffect::Advance);

        let (bombs, plain): (Vec<Bubble>, Vec<Bubble>) = dropped
            .into_iter()
            .partition(|b| b.kind == BubbleKind::Bomb);

        if !plain.is_empty() {
            self.report.push_batch(AnimationKind::Drop, plain);
            self.audio.play(SoundEffect::Drop);
        }
        if !bombs.is_empty() {
            let mut result = ClearResult::new();
            result.dropped = bombs;
            self.detonate_dropped_bombs(&mut result);
            self.fold_clear_result(result);
        }
    }

    /// Detonate bombs that fell in `result`, once each
    fn detonate_dropped_bombs(&mut self, result: &mut ClearResult) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        for _ in 0..board.detonate_dropped_bombs(result) {
            self.audio.play(SoundEffect::Bomb);
        }
    }

    /// Resolve a landing's clear event: dropped bombs go off, then it is scored
    fn handle_clear_result(&mut self, mut result: ClearResult) {
        self.detonate_dropped_bombs(&mut result);
        self.fold_clear_result(result);
    }

    /// Fold one clear event into score, audio, text and animation output
    ///
    /// Bombs still in `dropped` fall inert.
    fn fold_clear_result(&mut self, mut result: ClearResult) {
        let Some(board) = self.board.as_mut() else {
            return;
        };

        result.compute_score();
        self.score += result.total_score();

        let chest_pos = result
            .popped
            .iter()
            .chain(result.dropped.iter())
            .find(|b| b.kind == BubbleKind::Chest)
            .map(|b| b.pos);
        if let Some(pos) = chest_pos {
            let track = self.stage / 10;
            if track > 0 {
                self.audio.play(SoundEffect::Chest);
                self.audio.unlock_bonus_track(track);
                if self.settings.unlock_bonus_track(track) {
                    self.settings.save(&mut self.store);
                }
                self.report.texts.push(TextCue::banner(
                    format!("Bonus track #{track} of {BONUS_TRACKS} discovered!"),
                    pos,
                    CHEST_TEXT_COLOR,
                    3.0,
                ));
                log::info!("Bonus track {track} unlocked");
            }
        }

        if result.helper_line_activated {
            self.helper_line_active = true;
            let pos = result
                .popped
                .iter()
                .find(|b| b.kind == BubbleKind::PowerUp)
                .map(|b| b.pos)
                .unwrap_or_else(|| Vec2::new(board.abstract_width() / 2.0, board.abstract_height() / 2.0));
            self.report
                .texts
                .push(TextCue::banner("Aiming Helper!", pos, HELPER_TEXT_COLOR, 2.5));
        }

        for bubble in &result.dropped {
            self.report
                .texts
                .push(TextCue::score("+20", bubble.pos, DROP_TEXT_COLOR));
        }
        for bubble in &result.popped {
            self.report
                .texts
                .push(TextCue::score("+10", bubble.pos, POP_TEXT_COLOR));
            self.audio.play(SoundEffect::Pop);
        }
        if result.combo_multiplier() > 1 {
            let sum: Vec2 = result.dropped.iter().map(|b| b.pos).sum();
            let center = sum / result.dropped.len() as f32;
            self.report.texts.push(TextCue::banner(
                format!("x{} COMBO!", result.combo_multiplier()),
                center,
                COMBO_TEXT_COLOR,
                2.5,
            ));
        }
        if !result.dropped.is_empty() {
            self.audio.play(SoundEffect::Drop);
        }

        let stage_cleared = board.all_colors_cleared();
        self.report.push_batch(AnimationKind::Pop, result.popped);
        self.report.push_batch(AnimationKind::Drop, result.dropped);

        if stage_cleared {
            self.audio.play(SoundEffect::ClearStage);
            self.score += STAGE_CLEAR_BONUS * self.stage;
            self.phase = GamePhase::StageCleared;
            log::info!("Stage {} cleared, score {}", self.stage, self.score);
        }
    }

    /// Write the resumable state into the settings save slot
    pub fn save_state(&mut self) {
        if self.phase != GamePhase::InGame {
            return;
        }
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let saved = SavedGame {
            score: self.score,
            stage: self.stage,
            shots_until_drop: self.shots_until_drop,
            time_until_drop: self.time_until_drop,
            helper_line_active: self.helper_line_active,
            bubbles: board.bubbles().iter().map(SavedBubble::from_bubble).collect(),
            next_bubble: self.next.as_ref().map(|b| b.kind.code()),
            ceiling_y: Some(board.ceiling_y()),
            counters: self.counters,
        };
        self.settings.saved_game = Some(saved);
        self.settings.save(&mut self.store);
    }

    /// Rebuild a stage from a saved record
    ///
    /// The stage is set up first and the saved counters applied on top.
    pub fn load_state(&mut self, saved: &SavedGame) {
        self.stage = saved.stage.max(1);
        self.score = saved.score;
        self.setup_stage();

        self.shots_until_drop = saved.shots_until_drop.max(1);
        self.time_until_drop = saved.time_until_drop;
        self.helper_line_active = saved.helper_line_active;
        self.counters = saved.counters;

        let Some(board) = self.board.as_mut() else {
            return;
        };
        if let Some(ceiling_y) = saved.ceiling_y {
            board.set_ceiling_y(ceiling_y);
        }
        let bubbles = saved.bubbles.iter().filter_map(|b| match b.kind() {
            Some(kind) => Some((kind, b.pos)),
            None => {
                log::warn!("Skipping saved bubble with unknown kind {}", b.kind);
                None
            }
        });
        board.replace_bubbles(bubbles);
        self.next = match saved.next_bubble.and_then(BubbleKind::from_code) {
            Some(kind) => Some(board.mint(kind, Vec2::ZERO)),
            None => self.create_ammo(),
        };
    }

    pub fn clear_saved_game(&mut self) {
        if self.settings.saved_game.take().is_some() {
            self.settings.save(&mut self.store);
        }
    }
}
