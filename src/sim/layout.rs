//! Board generation: stage layouts, versus rows and incoming junk

use glam::Vec2;
use rand::Rng;

use super::board::{Board, RowGrowth};
use super::bubble::{BubbleId, BubbleKind};
use super::lattice::Lattice;

/// Versus boards are always this wide
pub const VERSUS_WIDTH: u32 = 9;
/// Rows a versus board starts with
pub const VERSUS_ROWS: u32 = 3;

/// Share of a stage's bubbles turned into junk (stage 3+)
const JUNK_FRACTION: f32 = 0.15;
/// Placement attempts per junk bubble
const JUNK_ATTEMPTS: u32 = 20;
/// Largest mirror cluster attached in one go
const MAX_CLUSTER: u32 = 5;

/// Board width for a single-player stage
pub fn stage_width(stage: u32) -> u32 {
    match stage {
        0..=2 => 7,
        10.. => 11,
        _ => 8,
    }
}

/// Rows laid out at the start of a stage
pub fn stage_rows(width: u32, stage: u32) -> u32 {
    let base = match width {
        7 => 4,
        8 => 5,
        _ => 6,
    };
    if stage >= 20 { base + 2 } else { base }
}

impl Board {
    /// Fill a fresh stage: full rows of allowed colours, then curated specials
    pub(super) fn fill_stage(&mut self, stage: u32) {
        self.bubbles.clear();
        let rows = stage_rows(self.lattice.width, stage);
        for row in 0..rows as i32 {
            self.push_row(row, Lattice::is_staggered(row, false));
        }
        self.abstract_height = rows as f32 * self.lattice.row_height() + self.lattice.radius * 2.0;
        self.seed_stage_specials(stage);
        log::info!(
            "Stage {stage} layout: {} bubbles, width {}",
            self.bubbles.len(),
            self.lattice.width
        );
    }

    /// Fill a fresh versus board and sprinkle specials over it
    pub(super) fn fill_versus(&mut self) {
        self.bubbles.clear();
        for row in 0..VERSUS_ROWS as i32 {
            self.push_row(row, Lattice::is_staggered(row, false));
        }
        self.growth = RowGrowth::Scrolling {
            next_row_staggered: VERSUS_ROWS % 2 != 0,
        };
        self.abstract_height =
            VERSUS_ROWS as f32 * self.lattice.row_height() + self.lattice.radius * 2.0;
        let ids: Vec<BubbleId> = self.bubbles.iter().map(|b| b.id).collect();
        self.sprinkle_specials(&ids);
    }

    /// Push the board down one row and fill the freed top row
    ///
    /// Only scrolling boards grow this way; a descending board is left alone.
    pub fn advance_and_refill(&mut self) {
        let RowGrowth::Scrolling { next_row_staggered } = self.growth else {
            log::warn!("advance_and_refill on a descending board ignored");
            return;
        };
        let h = self.lattice.row_height();
        for bubble in &mut self.bubbles {
            bubble.pos.y += h;
        }
        self.abstract_height += h;

        let ids = self.push_row(0, next_row_staggered);
        self.growth = RowGrowth::Scrolling {
            next_row_staggered: !next_row_staggered,
        };
        self.sprinkle_specials(&ids);
        log::debug!("Pressure row added ({} bubbles on board)", self.bubbles.len());
    }

    /// Fill one lattice row with random allowed colours
    fn push_row(&mut self, row: i32, staggered: bool) -> Vec<BubbleId> {
        let mut ids = Vec::new();
        if self.allowed.is_empty() {
            return ids;
        }
        for col in 0..self.lattice.row_len(staggered) as i32 {
            let kind = self.allowed[self.rng.random_range(0..self.allowed.len())];
            let pos = self.lattice.slot(row, col, staggered);
            let bubble = self.mint(kind, pos);
            ids.push(bubble.id);
            self.bubbles.push(bubble);
        }
        ids
    }

    /// Convert up to `count` random ordinary bubbles into `kind`
    fn convert_random(&mut self, kind: BubbleKind, count: u32) {
        let mut candidates: Vec<BubbleId> = self
            .bubbles
            .iter()
            .filter(|b| b.kind.is_ordinary())
            .map(|b| b.id)
            .collect();
        for _ in 0..count {
            if candidates.is_empty() {
                break;
            }
            let id = candidates.remove(self.rng.random_range(0..candidates.len()));
            if let Some(bubble) = self.get_mut(id) {
                bubble.recolor(kind);
            }
        }
    }

    fn seed_stage_specials(&mut self, stage: u32) {
        if stage >= 3 {
            self.seed_power_up();
            self.seed_junk();
        }
        if stage >= 5 {
            let bombs = if stage >= 10 { 3 } else { self.rng.random_range(1..=2) };
            self.convert_random(BubbleKind::Bomb, bombs);
        }
        if stage >= 7 && (stage - 7) % 6 == 0 {
            self.convert_random(BubbleKind::Star, 1);
        }
        if stage >= 9 {
            self.convert_random(BubbleKind::Paint, 2);
        }
        if stage >= 11 {
            self.convert_random(BubbleKind::Mirror, 5);
        }
        if stage % 10 == 0 && stage <= 50 {
            self.convert_random(BubbleKind::Chest, 1);
        }
    }

    /// One power-up somewhere in the lower half of the layout
    fn seed_power_up(&mut self) {
        let middle = self.lattice.row_height() * 2.0 + self.lattice.ceiling_y;
        let lower: Vec<BubbleId> = self
            .bubbles
            .iter()
            .filter(|b| b.kind.is_ordinary() && b.pos.y > middle)
            .map(|b| b.id)
            .collect();
        if lower.is_empty() {
            return;
        }
        let id = lower[self.rng.random_range(0..lower.len())];
        if let Some(bubble) = self.get_mut(id) {
            bubble.recolor(BubbleKind::PowerUp);
        }
    }

    /// Scatter junk away from the walls and away from other junk
    fn seed_junk(&mut self) {
        let target = (self.bubbles.len() as f32 * JUNK_FRACTION) as usize;
        let left = self.lattice.spacing;
        let right = self.lattice.abstract_width() - self.lattice.spacing;
        let min_gap = self.lattice.spacing * 2.0;
        let mut placed: Vec<Vec2> = Vec::new();

        for _ in 0..target {
            for _ in 0..JUNK_ATTEMPTS {
                let idx = self.rng.random_range(0..self.bubbles.len());
                let candidate = &self.bubbles[idx];
                if !candidate.kind.is_ordinary() || candidate.pos.x <= left || candidate.pos.x >= right {
                    continue;
                }
                if placed.iter().any(|p| p.distance(candidate.pos) < min_gap) {
                    continue;
                }
                placed.push(candidate.pos);
                self.bubbles[idx].recolor(BubbleKind::Junk);
                break;
            }
        }
    }

    /// Random specials over freshly added versus bubbles
    fn sprinkle_specials(&mut self, ids: &[BubbleId]) {
        let mut candidates: Vec<BubbleId> = ids
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|b| b.kind.is_ordinary()))
            .collect();
        let table = [
            (BubbleKind::PowerUp, 15),
            (BubbleKind::Bomb, 30),
            (BubbleKind::Paint, 20),
            (BubbleKind::Star, 5),
        ];
        for (kind, chance) in table {
            // the roll is always drawn so both peers consume the stream alike
            let roll = self.rng.random_range(0..100);
            if roll < chance && !candidates.is_empty() {
                let id = candidates.remove(self.rng.random_range(0..candidates.len()));
                if let Some(bubble) = self.get_mut(id) {
                    bubble.recolor(kind);
                }
            }
        }
    }

    /// Attach `count` mirror bubbles below the lowest bubbles, in clusters
    ///
    /// Returns how many were actually placed; a full or empty board takes
    /// fewer.
    pub fn attach_junk(&mut self, count: u32) -> u32 {
        if self.bubbles.is_empty() || count == 0 {
            return 0;
        }
        let top = self.top_row_staggered();
        let spacing = self.lattice.spacing;
        let lowest = self
            .bubbles
            .iter()
            .map(|b| b.pos.y)
            .fold(f32::MIN, f32::max);
        let below: Vec<Vec2> = self
            .lattice
            .neighbor_offsets()
            .into_iter()
            .filter(|o| o.y > 0.01)
            .collect();

        let mut attach: Vec<Vec2> = Vec::new();
        for bubble in self.bubbles.iter().filter(|b| b.pos.y > lowest - spacing) {
            for offset in &below {
                let slot = self.lattice.nearest_slot(bubble.pos + *offset, top);
                if self.lattice.in_bounds(slot)
                    && !self.bubbles.iter().any(|b| Lattice::same_slot(b.pos, slot))
                    && !attach.iter().any(|p| Lattice::same_slot(*p, slot))
                {
                    attach.push(slot);
                }
            }
        }

        let mut placed = 0;
        let mut remaining = count;
        while remaining > 0 && !attach.is_empty() {
            let start = attach.remove(self.rng.random_range(0..attach.len()));
            attach.retain(|p| p.distance(start) > spacing * 3.0);

            let cluster = self.rng.random_range(2..=remaining.clamp(2, MAX_CLUSTER));
            let mut last = start;
            let mut in_cluster = 0;
            while in_cluster < cluster && remaining > 0 {
                if !self.lattice.in_bounds(last)
                    || self.bubbles.iter().any(|b| Lattice::same_slot(b.pos, last))
                {
                    break;
                }
                let mirror = self.mint(BubbleKind::Mirror, last);
                self.bubbles.push(mirror);
                in_cluster += 1;
                placed += 1;
                remaining -= 1;

                let offset = below[self.rng.random_range(0..below.len())];
                last = self.snapped_position(last + offset);
            }
        }
        log::debug!("Attached {placed}/{count} junk bubbles");
        placed
    }
}
