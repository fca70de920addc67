//! Two-player versus session
//!
//! Both peers derive the same round seeds from a shared passphrase, so board
//! layouts and ammo queues match without exchanging state. Only attacks,
//! board previews and match control travel over the link. Each board is
//! simulated independently; previews are never reconciled.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use sha2::{Digest, Sha256};

use crate::audio::{AudioSink, SoundEffect};
use crate::net::{BoardSnapshot, Inbox, Message, PayloadAction, PeerEvent, PeerLink, snapshot};
use crate::sim::{
    AnimationKind, Board, Bubble, BubbleKind, ClearResult, TickReport, all_colors,
    step_projectile,
};
use crate::tuning::Tuning;
use crate::{aim_direction, game_over_line};

/// Seeds derived per match
pub const ROUND_SEEDS: usize = 9;

/// PCG stream for the ammo queue (the board uses the default stream)
const AMMO_STREAM: u64 = 0xa11e;

/// Nine round seeds from little-endian i32 windows of the passphrase hash
///
/// Windows start at `(i * 4) % 32`, so the ninth seed repeats the first.
pub fn derive_round_seeds(passphrase: &str) -> [i32; ROUND_SEEDS] {
    let hash = Sha256::digest(passphrase.as_bytes());
    std::array::from_fn(|i| {
        let at = (i * 4) % hash.len();
        i32::from_le_bytes([hash[at], hash[at + 1], hash[at + 2], hash[at + 3]])
    })
}

/// Where the match stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// No match running
    Idle,
    RoundInProgress,
    /// Round decided, waiting for both rematch requests
    RoundOver,
    /// A player reached the winning score
    MatchOver,
    /// Peer left or the transport failed
    Disconnected,
}

pub struct VersusSession<L: PeerLink, A: AudioSink> {
    state: MatchState,
    round_seeds: [i32; ROUND_SEEDS],
    /// 1-based once a round has started
    current_round: u32,
    my_score: u32,
    opponent_score: u32,
    last_round_won: Option<bool>,
    board: Option<Board>,
    active: Option<Bubble>,
    next: Option<Bubble>,
    ammo: VecDeque<BubbleKind>,
    ammo_rng: Pcg32,
    attack_charge: u32,
    pressure_timer: f32,
    state_push_timer: f32,
    incoming_junk: VecDeque<u32>,
    opponent_board: Option<BoardSnapshot>,
    helper_line_active: bool,
    rematch_requested: bool,
    opponent_rematch: bool,
    game_over_line: f32,
    report: TickReport,
    tuning: Tuning,
    link: L,
    inbox: Inbox,
    audio: A,
}

impl<L: PeerLink, A: AudioSink> VersusSession<L, A> {
    pub fn new(tuning: Tuning, link: L, inbox: Inbox, audio: A) -> Self {
        Self {
            state: MatchState::Idle,
            round_seeds: [0; ROUND_SEEDS],
            current_round: 0,
            my_score: 0,
            opponent_score: 0,
            last_round_won: None,
            board: None,
            active: None,
            next: None,
            ammo: VecDeque::new(),
            ammo_rng: Pcg32::seed_from_u64(0),
            attack_charge: 0,
            pressure_timer: 0.0,
            state_push_timer: 0.0,
            incoming_junk: VecDeque::new(),
            opponent_board: None,
            helper_line_active: false,
            rematch_requested: false,
            opponent_rematch: false,
            game_over_line: 0.0,
            report: TickReport::default(),
            tuning,
            link,
            inbox,
            audio,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn my_score(&self) -> u32 {
        self.my_score
    }

    pub fn opponent_score(&self) -> u32 {
        self.opponent_score
    }

    /// `Some(true)` if the last decided round was ours
    pub fn last_round_won(&self) -> Option<bool> {
        self.last_round_won
    }

    /// `Some(true)` when we won the match, `None` while it is undecided
    pub fn match_winner(&self) -> Option<bool> {
        if self.state != MatchState::MatchOver {
            return None;
        }
        Some(self.my_score > self.opponent_score)
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn active(&self) -> Option<&Bubble> {
        self.active.as_ref()
    }

    pub fn next(&self) -> Option<&Bubble> {
        self.next.as_ref()
    }

    /// Ammo after the loaded bubble, in firing order
    pub fn upcoming_ammo(&self) -> &VecDeque<BubbleKind> {
        &self.ammo
    }

    pub fn attack_charge(&self) -> u32 {
        self.attack_charge
    }

    /// Attacks received but not yet applied
    pub fn pending_junk(&self) -> usize {
        self.incoming_junk.len()
    }

    pub fn opponent_board(&self) -> Option<&BoardSnapshot> {
        self.opponent_board.as_ref()
    }

    pub fn helper_line_active(&self) -> bool {
        self.helper_line_active
    }

    pub fn game_over_line(&self) -> f32 {
        self.game_over_line
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Start a match; both peers must use the same passphrase
    pub fn start_match(&mut self, passphrase: &str) {
        self.round_seeds = derive_round_seeds(passphrase);
        self.current_round = 0;
        self.my_score = 0;
        self.opponent_score = 0;
        self.last_round_won = None;
        self.start_round();
        self.audio.start_playlist();
        log::info!("Versus match started");
    }

    fn start_round(&mut self) {
        let idx = (self.current_round as usize).min(ROUND_SEEDS - 1);
        let seed = u64::from(self.round_seeds[idx] as u32);

        let board = Board::versus(seed);
        self.game_over_line = game_over_line(board.abstract_width());
        self.board = Some(board);
        self.ammo_rng = Pcg32::new(seed, AMMO_STREAM);

        self.active = None;
        self.report = TickReport::default();
        self.attack_charge = 0;
        self.pressure_timer = self.tuning.pressure_interval;
        self.state_push_timer = 0.0;
        self.incoming_junk.clear();
        self.rematch_requested = false;
        self.opponent_rematch = false;
        self.helper_line_active = false;
        self.current_round += 1;

        self.refill_ammo();
        self.next = self.pop_ammo();
        self.state = MatchState::RoundInProgress;
        log::info!("Round {} started", self.current_round);
    }

    fn refill_ammo(&mut self) {
        self.ammo.clear();
        let colors = all_colors();
        for _ in 0..self.tuning.ammo_queue_len {
            self.ammo
                .push_back(colors[self.ammo_rng.random_range(0..colors.len())]);
        }
    }

    fn pop_ammo(&mut self) -> Option<Bubble> {
        if self.ammo.is_empty() {
            self.refill_ammo();
        }
        let kind = self.ammo.pop_front()?;
        let board = self.board.as_mut()?;
        Some(board.mint(kind, Vec2::ZERO))
    }

    /// Launch the loaded bubble; ignored outside a round or mid-flight
    pub fn fire(&mut self, direction: Vec2, origin: Vec2) -> bool {
        if self.state != MatchState::RoundInProgress || self.active.is_some() {
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
        bubble.vel = dir * self.tuning.versus_projectile_speed;
        self.active = Some(bubble);
        self.next = self.pop_ammo();
        true
    }

    /// Ask for the next round; it starts once both peers have asked
    pub fn request_rematch(&mut self) -> bool {
        if self.rematch_requested
            || !matches!(self.state, MatchState::RoundOver | MatchState::MatchOver)
        {
            return false;
        }
        self.send(Message::control(PayloadAction::Rematch));
        self.rematch_requested = true;
        self.maybe_start_rematch();
        true
    }

    fn maybe_start_rematch(&mut self) {
        if !(self.rematch_requested && self.opponent_rematch) {
            return;
        }
        match self.state {
            MatchState::RoundOver => self.start_round(),
            MatchState::MatchOver => {
                self.current_round = 0;
                self.my_score = 0;
                self.opponent_score = 0;
                self.last_round_won = None;
                self.start_round();
            }
            _ => {}
        }
    }

    /// Leave the match and tell the peer
    pub fn leave(&mut self) {
        if self.state != MatchState::Idle {
            self.send(Message::control(PayloadAction::Disconnect));
        }
        self.board = None;
        self.active = None;
        self.next = None;
        self.state = MatchState::Idle;
        log::info!("Left versus match");
    }

    /// Advance the session by `dt` seconds
    ///
    /// Inbound events are drained first so they apply in arrival order
    /// relative to local simulation.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.drain_inbox();
        if self.state == MatchState::RoundInProgress {
            self.step_round(dt);
        }
        std::mem::take(&mut self.report)
    }

    fn step_round(&mut self, dt: f32) {
        let Some(board) = self.board.as_mut() else {
            return;
        };

        self.pressure_timer -= dt;
        if self.pressure_timer <= 0.0 {
            board.advance_and_refill();
            self.pressure_timer = self.tuning.pressure_interval;
            self.audio.play(SoundEffect::Advance);
        }

        self.state_push_timer += dt;
        let mut preview = None;
        if self.state_push_timer >= self.tuning.state_push_interval {
            self.state_push_timer = 0.0;
            if !board.is_empty() {
                preview = Some(Message::board_state(snapshot::encode(board.bubbles())));
            }
        }
        if let Some(frame) = preview {
            self.send(frame);
        }

        self.update_active(dt);

        let topped_out = self
            .board
            .as_ref()
            .is_some_and(|b| b.reaches(self.game_over_line));
        if topped_out {
            self.lose_round();
            return;
        }

        if let Some(count) = self.incoming_junk.pop_front() {
            if let Some(board) = self.board.as_mut() {
                board.attach_junk(count);
            }
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

    /// Charge attacks and queue animations for one clear event
    fn handle_clear_result(&mut self, mut result: ClearResult) {
        if let Some(board) = self.board.as_mut() {
            for _ in 0..board.detonate_dropped_bombs(&mut result) {
                self.audio.play(SoundEffect::Bomb);
            }
        }
        if result.helper_line_activated {
            self.helper_line_active = true;
        }

        let cleared = result.cleared_count() as u32;
        if cleared > 0 {
            self.attack_charge += cleared;
            if let Some(rows) = self.tuning.attack_size(self.attack_charge) {
                if rows > 0 {
                    log::info!("Sending attack of {rows}");
                    self.send(Message::attack(rows));
                }
                self.attack_charge = 0;
            }
        }

        for _ in &result.popped {
            self.audio.play(SoundEffect::Pop);
        }
        if !result.dropped.is_empty() {
            self.audio.play(SoundEffect::Drop);
        }
        self.report.push_batch(AnimationKind::Pop, result.popped);
        self.report.push_batch(AnimationKind::Drop, result.dropped);
    }

    fn lose_round(&mut self) {
        self.opponent_score += 1;
        self.last_round_won = Some(false);
        self.send(Message::control(PayloadAction::UpdateScore));
        self.finish_round();
        log::info!(
            "Round {} lost ({}-{})",
            self.current_round,
            self.my_score,
            self.opponent_score
        );
    }

    fn win_round(&mut self) {
        self.my_score += 1;
        self.last_round_won = Some(true);
        self.audio.play(SoundEffect::ClearStage);
        self.finish_round();
        log::info!(
            "Round {} won ({}-{})",
            self.current_round,
            self.my_score,
            self.opponent_score
        );
    }

    fn finish_round(&mut self) {
        self.active = None;
        let decided = self.my_score.max(self.opponent_score) >= self.tuning.rounds_to_win
            || self.current_round >= self.tuning.max_rounds;
        self.state = if decided {
            MatchState::MatchOver
        } else {
            MatchState::RoundOver
        };
    }

    fn drain_inbox(&mut self) {
        for event in self.inbox.drain() {
            match event {
                PeerEvent::Attack(rows) => {
                    if rows > 0 && self.state == MatchState::RoundInProgress {
                        log::info!("Incoming attack of {rows}");
                        self.incoming_junk.push_back(rows);
                    }
                }
                PeerEvent::OpponentBoard(board) => self.opponent_board = Some(board),
                PeerEvent::Control(PayloadAction::UpdateScore) => {
                    if self.state == MatchState::RoundInProgress {
                        self.win_round();
                    }
                }
                PeerEvent::Control(PayloadAction::Rematch) => {
                    self.opponent_rematch = true;
                    self.maybe_start_rematch();
                }
                PeerEvent::Control(PayloadAction::Disconnect) | PeerEvent::Disconnected => {
                    if self.state != MatchState::Idle {
                        log::warn!("Peer disconnected, ending match");
                        self.active = None;
                        self.state = MatchState::Disconnected;
                    }
                }
                PeerEvent::Control(action) => {
                    log::debug!("Ignoring match control {action:?}");
                }
            }
        }
    }

    /// Fire-and-forget send; failures surface through the transport's own
    /// disconnect event
    fn send(&mut self, message: Message) {
        if let Err(err) = self.link.send(message.encode()) {
            log::warn!("Peer send failed: {err}");
        }
    }
}
