//! Determinism tests.
//!
//! Versus peers never exchange board state, so everything generated from a
//! seed must be bit-identical on both sides.

use glam::Vec2;

use hexpop::audio::NullAudio;
use hexpop::net::{BoardSnapshot, NullLink, inbox, snapshot};
use hexpop::persistence::MemoryStore;
use hexpop::sim::{Board, BubbleKind};
use hexpop::versus::{MatchState, derive_round_seeds};
use hexpop::{GameSession, Tuning, VersusSession};

fn versus_peer(passphrase: &str) -> VersusSession<NullLink, NullAudio> {
    let (_tx, inbox) = inbox();
    let mut session = VersusSession::new(Tuning::default(), NullLink, inbox, NullAudio);
    session.start_match(passphrase);
    session
}

fn layout(board: &Board) -> Vec<(Vec2, BubbleKind)> {
    board.bubbles().iter().map(|b| (b.pos, b.kind)).collect()
}

#[test]
fn same_passphrase_same_round() {
    let a = versus_peer("tuesday night");
    let b = versus_peer("tuesday night");

    assert_eq!(a.state(), MatchState::RoundInProgress);
    assert_eq!(layout(a.board().unwrap()), layout(b.board().unwrap()));
    assert_eq!(a.next().unwrap().kind, b.next().unwrap().kind);
    assert_eq!(a.upcoming_ammo(), b.upcoming_ammo());
    assert_eq!(a.upcoming_ammo().len() + 1, 500);
}

#[test]
fn different_passphrase_different_round() {
    let a = versus_peer("tuesday night");
    let b = versus_peer("wednesday night");
    assert_ne!(a.upcoming_ammo(), b.upcoming_ammo());
}

#[test]
fn pressure_rows_stay_in_lockstep() {
    let mut a = versus_peer("lockstep");
    let mut b = versus_peer("lockstep");
    for _ in 0..3 {
        a.tick(10.0);
        b.tick(10.0);
    }
    assert_eq!(layout(a.board().unwrap()), layout(b.board().unwrap()));
}

#[test]
fn round_seeds_are_stable() {
    assert_eq!(derive_round_seeds("hexpop"), derive_round_seeds("hexpop"));
    let seeds = derive_round_seeds("hexpop");
    assert_eq!(seeds[8], seeds[0]);
}

#[test]
fn single_player_replays_identically() {
    let play = || {
        let mut session = GameSession::new(99, Tuning::default(), NullAudio, MemoryStore::default());
        session.start_new_game();
        let aims = [-0.6, 0.3, 0.0, 0.8, -0.2, 0.5, -0.9, 0.1];
        for aim in aims {
            let origin = Vec2::new(
                session.board().unwrap().abstract_width() / 2.0,
                session.game_over_line(),
            );
            session.fire(Vec2::new(aim, -1.0), origin);
            for _ in 0..240 {
                session.tick(1.0 / 120.0);
            }
        }
        (session.score(), session.board().unwrap().bubbles().to_vec())
    };

    let (score_a, board_a) = play();
    let (score_b, board_b) = play();
    assert_eq!(score_a, score_b);
    assert_eq!(board_a, board_b);
}

#[test]
fn preview_matches_board() {
    let session = versus_peer("preview");
    let board = session.board().unwrap();
    let preview = BoardSnapshot::decode(&snapshot::encode(board.bubbles())).unwrap();

    assert_eq!(preview.len(), board.len());
    for (sent, got) in board.bubbles().iter().zip(&preview.bubbles) {
        assert_eq!(got.pos, sent.pos);
        assert_eq!(got.kind(), Some(sent.kind));
    }
}
