//! Property-based tests for board invariants.
//!
//! Boards come from the real stage generator, so every case exercises a
//! layout the game can actually produce.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use proptest::prelude::*;

use hexpop::sim::{Board, Lattice};

fn stage_board(stage: u32, seed: u64) -> Board {
    Board::single_player(stage, seed)
}

/// Snap a landing point spread over the occupied area and check the slot
fn check_snap(board: &Board, fx: f32, fy: f32) -> Result<(), TestCaseError> {
    let lattice = board.lattice();
    let lowest = board.bubbles().iter().map(|b| b.pos.y).fold(lattice.ceiling_y, f32::max);
    let landing = Vec2::new(
        lattice.radius + fx * (board.abstract_width() - lattice.spacing),
        lattice.ceiling_y + fy * (lowest + lattice.spacing - lattice.ceiling_y),
    );

    let slot = board.snapped_position(landing);
    prop_assert!(lattice.in_bounds(slot));
    prop_assert!(!board.bubbles().iter().any(|b| Lattice::same_slot(b.pos, slot)));
    prop_assert!(Lattice::same_slot(lattice.nearest_slot(slot, board.top_row_staggered()), slot));

    let on_top_row = (slot.y - lattice.ceiling_y).abs() < 1e-3;
    let touches = board
        .bubbles()
        .iter()
        .any(|b| b.pos.distance(slot) <= board.adjacency_reach());
    prop_assert!(on_top_row || touches);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn snapped_slot_is_free_and_stickable(
        stage in 1u32..40,
        seed in any::<u64>(),
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
    ) {
        check_snap(&stage_board(stage, seed), fx, fy)?;
    }

    #[test]
    fn versus_snap_tracks_top_row_stagger(
        seed in any::<u64>(),
        refills in 0usize..4,
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
    ) {
        let mut board = Board::versus(seed);
        for _ in 0..refills {
            board.advance_and_refill();
        }
        prop_assert_eq!(board.top_row_staggered(), refills % 2 == 1);
        check_snap(&board, fx, fy)?;
    }

    #[test]
    fn connected_group_is_maximal(stage in 1u32..40, seed in any::<u64>(), pick in any::<usize>()) {
        let board = stage_board(stage, seed);
        prop_assume!(!board.is_empty());
        let start = &board.bubbles()[pick % board.len()];

        let group = board.find_connected(start.id);
        if !start.kind.is_ordinary() {
            prop_assert!(group.is_empty());
            return Ok(());
        }

        prop_assert_eq!(group[0], start.id);
        let members: HashSet<_> = group.iter().copied().collect();
        prop_assert_eq!(members.len(), group.len());
        for id in &group {
            let bubble = board.get(*id).unwrap();
            prop_assert_eq!(bubble.kind, start.kind);
            for neighbor in board.neighbors(*id) {
                if board.get(neighbor).unwrap().kind == start.kind {
                    prop_assert!(members.contains(&neighbor));
                }
            }
        }
    }

    #[test]
    fn ceiling_advance_shifts_every_survivor(stage in 1u32..40, seed in any::<u64>()) {
        let mut board = stage_board(stage, seed);
        let before: HashMap<_, _> = board.bubbles().iter().map(|b| (b.id, b.pos)).collect();
        let ceiling = board.ceiling_y();
        let step = board.lattice().row_height();

        let dropped = board.advance_ceiling();
        prop_assert!((board.ceiling_y() - ceiling - step).abs() < 1e-4);
        prop_assert_eq!(dropped.len() + board.len(), before.len());
        for bubble in board.bubbles() {
            let old = before[&bubble.id];
            prop_assert!((bubble.pos.x - old.x).abs() < 1e-5);
            prop_assert!((bubble.pos.y - old.y - step).abs() < 1e-4);
        }

        // whatever survived is still anchored
        prop_assert!(board.remove_disconnected().is_empty());
    }
}
