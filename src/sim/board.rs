//! The hex board: bubble storage, snapping, connectivity and matching
//!
//! One engine serves both game modes. The only difference between them is
//! the [`RowGrowth`] policy, which decides the stagger of the top row and how
//! new bubbles arrive (see `layout.rs`).

use std::collections::{BTreeSet, HashSet, VecDeque};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bubble::{Bubble, BubbleId, BubbleKind, stage_colors, all_colors};
use super::clear::ClearResult;
use super::collision::{Contact, nearest_within, touches_ceiling};
use super::lattice::Lattice;
use super::layout::{VERSUS_WIDTH, stage_width};
use crate::consts::{ADJACENCY_TOLERANCE, CEILING_BAND};

/// Minimum connected group size that pops
pub const MATCH_SIZE: usize = 3;

/// How rows enter the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGrowth {
    /// Single-player: rows are laid out once and the ceiling descends.
    /// Stagger is fixed by absolute row index, so the top row is never staggered.
    Descending,
    /// Versus: new rows are pushed in at the ceiling, so the top row's stagger
    /// alternates and has to be tracked.
    Scrolling { next_row_staggered: bool },
}

/// The bubble grid
#[derive(Debug, Clone)]
pub struct Board {
    /// Live bubbles in insertion order
    pub(super) bubbles: Vec<Bubble>,
    pub(super) lattice: Lattice,
    pub(super) growth: RowGrowth,
    /// Ordinary colours eligible as ammo on this stage/round
    pub(super) allowed: Vec<BubbleKind>,
    pub(super) abstract_height: f32,
    pub(super) rng: Pcg32,
    next_id: u32,
}

impl Board {
    /// A board with no bubbles
    pub fn empty(width: u32, growth: RowGrowth, allowed: Vec<BubbleKind>, seed: u64) -> Self {
        let lattice = Lattice::new(width);
        let abstract_height = lattice.radius * 2.0;
        Self {
            bubbles: Vec::new(),
            lattice,
            growth,
            allowed,
            abstract_height,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Single-player board for a stage, with curated special bubbles
    pub fn single_player(stage: u32, seed: u64) -> Self {
        let mut board = Self::empty(
            stage_width(stage),
            RowGrowth::Descending,
            stage_colors(stage),
            seed,
        );
        board.fill_stage(stage);
        board
    }

    /// Versus board generated from a round seed
    pub fn versus(seed: u64) -> Self {
        let mut board = Self::empty(
            VERSUS_WIDTH,
            RowGrowth::Scrolling {
                next_row_staggered: false,
            },
            all_colors(),
            seed,
        );
        board.fill_versus();
        board
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn growth(&self) -> RowGrowth {
        self.growth
    }

    pub fn allowed_colors(&self) -> &[BubbleKind] {
        &self.allowed
    }

    pub fn ceiling_y(&self) -> f32 {
        self.lattice.ceiling_y
    }

    /// Restore a saved ceiling offset; bubbles are not moved
    pub fn set_ceiling_y(&mut self, ceiling_y: f32) {
        let delta = ceiling_y - self.lattice.ceiling_y;
        self.lattice.ceiling_y = ceiling_y;
        self.abstract_height += delta;
    }

    pub fn abstract_width(&self) -> f32 {
        self.lattice.abstract_width()
    }

    pub fn abstract_height(&self) -> f32 {
        self.abstract_height
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub(super) fn get_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    /// Create a bubble with a fresh id (not inserted)
    pub fn mint(&mut self, kind: BubbleKind, pos: Vec2) -> Bubble {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        Bubble::new(id, kind, pos)
    }

    /// Insert a bubble exactly where it is
    pub fn insert(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    /// Remove one bubble by id
    pub fn remove(&mut self, id: BubbleId) -> Option<Bubble> {
        let idx = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.remove(idx))
    }

    /// Replace every bubble (used when restoring a saved game)
    pub fn replace_bubbles(&mut self, bubbles: impl IntoIterator<Item = (BubbleKind, Vec2)>) {
        self.bubbles.clear();
        for (kind, pos) in bubbles {
            let bubble = self.mint(kind, pos);
            self.bubbles.push(bubble);
        }
    }

    /// Remove and return every bubble matching `pred`, keeping order
    pub(super) fn take_where(&mut self, mut pred: impl FnMut(&Bubble) -> bool) -> Vec<Bubble> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.bubbles)
            .into_iter()
            .partition(|b| pred(b));
        self.bubbles = kept;
        taken
    }

    /// Stagger of the row touching the ceiling
    pub fn top_row_staggered(&self) -> bool {
        match self.growth {
            RowGrowth::Descending => false,
            RowGrowth::Scrolling { next_row_staggered } => !next_row_staggered,
        }
    }

    /// Distance under which two bubbles are neighbours
    #[inline]
    pub fn adjacency_reach(&self) -> f32 {
        self.lattice.spacing * ADJACENCY_TOLERANCE
    }

    fn is_occupied(&self, slot: Vec2) -> bool {
        self.bubbles.iter().any(|b| Lattice::same_slot(b.pos, slot))
    }

    /// Empty slot nearest to `landing` that a bubble can stick to
    ///
    /// Candidates are the empty top-row slots plus the empty lattice
    /// neighbours of every live bubble. With no candidate at all the landing
    /// point is still snapped to its nearest theoretical slot.
    pub fn snapped_position(&self, landing: Vec2) -> Vec2 {
        let top = self.top_row_staggered();
        let offsets = self.lattice.neighbor_offsets();

        let mut best: Option<(Vec2, f32)> = None;
        let mut consider = |slot: Vec2| {
            if !self.lattice.in_bounds(slot) || self.is_occupied(slot) {
                return;
            }
            let dist = landing.distance(slot);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((slot, dist));
            }
        };

        for slot in self.lattice.top_row(top) {
            consider(slot);
        }
        for bubble in &self.bubbles {
            for offset in offsets {
                consider(self.lattice.nearest_slot(bubble.pos + offset, top));
            }
        }

        match best {
            Some((slot, _)) => slot,
            None => {
                log::debug!("No stickable slot near {landing:?}, snapping in place");
                self.lattice.nearest_slot(landing, top)
            }
        }
    }

    /// What the projectile hit, if anything
    pub fn find_collision(&self, projectile: &Bubble) -> Option<Contact> {
        if touches_ceiling(projectile, self.lattice.ceiling_y) {
            return Some(Contact::Ceiling);
        }
        nearest_within(projectile.pos, self.lattice.spacing, &self.bubbles)
            .map(|b| Contact::Bubble(b.id))
    }

    /// Ids of every bubble adjacent to `id`
    pub fn neighbors(&self, id: BubbleId) -> Vec<BubbleId> {
        let Some(pos) = self.get(id).map(|b| b.pos) else {
            return Vec::new();
        };
        self.neighbors_at(pos, id).map(|b| b.id).collect()
    }

    fn neighbors_at(&self, pos: Vec2, exclude: BubbleId) -> impl Iterator<Item = &Bubble> + '_ {
        let reach = self.adjacency_reach();
        self.bubbles
            .iter()
            .filter(move |b| b.id != exclude && pos.distance(b.pos) <= reach)
    }

    /// Maximal same-kind group reachable from `start` (BFS order)
    ///
    /// Special kinds never seed a match and return an empty group.
    pub fn find_connected(&self, start: BubbleId) -> Vec<BubbleId> {
        let Some(first) = self.get(start) else {
            return Vec::new();
        };
        if !first.kind.is_ordinary() {
            return Vec::new();
        }
        let kind = first.kind;

        let mut seen = HashSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([first.pos]);
        while let Some(pos) = queue.pop_front() {
            for neighbor in self.bubbles.iter() {
                if neighbor.kind != kind || pos.distance(neighbor.pos) > self.adjacency_reach() {
                    continue;
                }
                if seen.insert(neighbor.id) {
                    order.push(neighbor.id);
                    queue.push_back(neighbor.pos);
                }
            }
        }
        order
    }

    /// Drop every bubble without a path to the ceiling band
    pub fn remove_disconnected(&mut self) -> Vec<Bubble> {
        if self.bubbles.is_empty() {
            return Vec::new();
        }
        let band = self.lattice.ceiling_y * CEILING_BAND;
        let reach = self.adjacency_reach();

        let mut supported = HashSet::new();
        let mut queue = VecDeque::new();
        for bubble in &self.bubbles {
            if bubble.pos.y - bubble.radius <= band && supported.insert(bubble.id) {
                queue.push_back(bubble.pos);
            }
        }
        while let Some(pos) = queue.pop_front() {
            for other in &self.bubbles {
                if pos.distance(other.pos) <= reach && supported.insert(other.id) {
                    queue.push_back(other.pos);
                }
            }
        }

        self.take_where(|b| !supported.contains(&b.id))
    }

    /// Pop the group containing `id` if it is large enough
    ///
    /// Power-ups, chests and bombs touching the group go with it. Bombs
    /// detonate once; bombs exposed by that blast are left for the support
    /// sweep.
    pub fn check_for_matches(&mut self, id: BubbleId) -> ClearResult {
        let mut result = ClearResult::new();
        let group = self.find_connected(id);
        if group.len() < MATCH_SIZE {
            return result;
        }
        let group: HashSet<BubbleId> = group.into_iter().collect();

        let mut bystanders = Vec::new();
        let mut seen = HashSet::new();
        for bubble in self.bubbles.iter().filter(|b| group.contains(&b.id)) {
            for neighbor in self.neighbors_at(bubble.pos, bubble.id) {
                if !group.contains(&neighbor.id) && seen.insert(neighbor.id) {
                    bystanders.push((neighbor.id, neighbor.kind));
                }
            }
        }
        let of_kind = |kind: BubbleKind| -> HashSet<BubbleId> {
            bystanders
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(id, _)| *id)
                .collect()
        };
        let power_ups = of_kind(BubbleKind::PowerUp);
        let chests = of_kind(BubbleKind::Chest);
        let bombs: Vec<BubbleId> = bystanders
            .iter()
            .filter(|(_, k)| *k == BubbleKind::Bomb)
            .map(|(id, _)| *id)
            .collect();

        result.popped = self.take_where(|b| group.contains(&b.id));

        if !power_ups.is_empty() {
            result.helper_line_activated = true;
            result.popped.extend(self.take_where(|b| power_ups.contains(&b.id)));
        }
        if !chests.is_empty() {
            result.popped.extend(self.take_where(|b| chests.contains(&b.id)));
        }
        for bomb in bombs {
            if let Some(pos) = self.get(bomb).map(|b| b.pos) {
                result.popped.extend(self.detonate(pos));
            }
        }

        result.dropped = self.remove_disconnected();
        result.compute_score();
        result
    }

    /// Snap a landed bubble into the grid and resolve what it causes
    ///
    /// A bomb detonates where it lands and never takes part in matching.
    pub fn add_bubble(&mut self, mut bubble: Bubble) -> ClearResult {
        bubble.pos = self.snapped_position(bubble.pos);
        bubble.vel = Vec2::ZERO;
        let (id, kind, pos) = (bubble.id, bubble.kind, bubble.pos);
        self.bubbles.push(bubble);

        if kind == BubbleKind::Bomb {
            let mut result = ClearResult::new();
            result.popped = self.detonate(pos);
            result.dropped = self.remove_disconnected();
            result.compute_score();
            return result;
        }
        self.check_for_matches(id)
    }

    /// Lower the ceiling one row and drop whatever loses support
    pub fn advance_ceiling(&mut self) -> Vec<Bubble> {
        let drop = self.lattice.row_height();
        self.lattice.ceiling_y += drop;
        self.abstract_height += drop;
        for bubble in &mut self.bubbles {
            bubble.pos.y += drop;
        }
        log::debug!("Ceiling advanced to {:.3}", self.lattice.ceiling_y);
        self.remove_disconnected()
    }

    /// Distinct ordinary colours still on the board, in palette order
    pub fn colors_on_board(&self) -> Vec<BubbleKind> {
        let indices: BTreeSet<u8> = self
            .bubbles
            .iter()
            .filter_map(|b| match b.kind {
                BubbleKind::Color(i) => Some(i),
                _ => None,
            })
            .collect();
        indices.into_iter().map(BubbleKind::Color).collect()
    }

    /// No ordinary colour left (specials and junk may remain)
    pub fn all_colors_cleared(&self) -> bool {
        !self.bubbles.iter().any(|b| b.kind.is_ordinary())
    }

    /// Any bubble's lower edge at or past `line_y`
    pub fn reaches(&self, line_y: f32) -> bool {
        self.bubbles.iter().any(|b| b.pos.y + b.radius >= line_y)
    }
}
