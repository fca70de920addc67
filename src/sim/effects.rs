//! Special bubble effects and landing dispatch

use glam::Vec2;

use super::board::Board;
use super::bubble::{Bubble, BubbleId, BubbleKind};
use super::clear::ClearResult;
use super::collision::Contact;
use crate::consts::BLAST_CELLS;

impl Board {
    /// Remove every bubble within two cells of `center`
    pub fn detonate(&mut self, center: Vec2) -> Vec<Bubble> {
        let blast = self.lattice.spacing * BLAST_CELLS;
        let removed = self.take_where(|b| center.distance(b.pos) <= blast);
        log::debug!("Bomb at {center:?} removed {} bubbles", removed.len());
        removed
    }

    /// Detonate each bomb that fell in `result`, once
    ///
    /// Blasts count as popped. Bombs exposed by a blast fall without
    /// detonating. Returns how many bombs went off.
    pub fn detonate_dropped_bombs(&mut self, result: &mut ClearResult) -> usize {
        let (bombs, dropped): (Vec<Bubble>, Vec<Bubble>) = std::mem::take(&mut result.dropped)
            .into_iter()
            .partition(|b| b.kind == BubbleKind::Bomb);
        result.dropped = dropped;
        if bombs.is_empty() {
            return 0;
        }
        let count = bombs.len();
        for bomb in &bombs {
            result.popped.extend(self.detonate(bomb.pos));
        }
        result.popped.extend(bombs);
        result.dropped.extend(self.remove_disconnected());
        count
    }

    /// Clear every bubble of `kind` and sweep unsupported ones
    pub fn activate_star(&mut self, kind: BubbleKind) -> ClearResult {
        let mut result = ClearResult::new();
        if kind.is_ordinary() {
            result.popped = self.take_where(|b| b.kind == kind);
            result.dropped = self.remove_disconnected();
        }
        result.compute_score();
        result
    }

    /// Repaint the ordinary neighbours of `location` to `kind`
    pub fn activate_paint(&mut self, location: BubbleId, kind: BubbleKind) {
        if !kind.is_ordinary() {
            return;
        }
        let Some(center) = self.get(location).map(|b| b.pos) else {
            return;
        };
        let reach = self.adjacency_reach();
        for bubble in self.bubbles.iter_mut() {
            if bubble.id != location && bubble.kind.is_ordinary() && center.distance(bubble.pos) <= reach {
                bubble.recolor(kind);
            }
        }
    }

    /// Turn a mirror into the colour that hit it
    pub fn transform_mirror(&mut self, mirror: BubbleId, kind: BubbleKind) {
        if !kind.is_ordinary() {
            return;
        }
        if let Some(bubble) = self.get_mut(mirror) {
            bubble.recolor(kind);
        }
    }

    /// Resolve a projectile that just made contact
    ///
    /// Star and paint projectiles are consumed by their effect. An ordinary
    /// projectile that hits a star, paint or mirror triggers that target.
    /// Everything else lands and goes through matching.
    pub fn resolve_landing(&mut self, active: Bubble, contact: Contact) -> ClearResult {
        let target = match contact {
            Contact::Bubble(id) => self.get(id).map(|b| (id, b.kind)),
            Contact::Ceiling => None,
        };

        let mut result = match (active.kind, target) {
            (BubbleKind::Star, Some((_, kind))) => self.activate_star(kind),
            (BubbleKind::Star, None) => ClearResult::new(),
            (BubbleKind::Paint, target) => {
                if let Some((id, kind)) = target {
                    self.activate_paint(id, kind);
                }
                ClearResult::new()
            }
            (kind, _) if !kind.is_ordinary() => return self.add_bubble(active),
            (kind, Some((id, BubbleKind::Star))) => {
                let mut result = self.activate_star(kind);
                self.consume_target(id, &mut result);
                result
            }
            (kind, Some((id, BubbleKind::Paint))) => {
                self.activate_paint(id, kind);
                let mut result = ClearResult::new();
                self.consume_target(id, &mut result);
                result
            }
            (kind, Some((id, BubbleKind::Mirror))) => {
                self.transform_mirror(id, kind);
                self.check_for_matches(id)
            }
            _ => return self.add_bubble(active),
        };

        result.popped.push(active);
        result.compute_score();
        result
    }

    /// Pop a triggered special and sweep what it was holding up
    fn consume_target(&mut self, id: BubbleId, result: &mut ClearResult) {
        if let Some(target) = self.remove(id) {
            result.popped.push(target);
            result.dropped.extend(self.remove_disconnected());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::tests::{blank, place};

    const RED: BubbleKind = BubbleKind::Color(0);
    const GREEN: BubbleKind = BubbleKind::Color(1);
    const BLUE: BubbleKind = BubbleKind::Color(2);

    #[test]
    fn test_star_projectile_clears_color() {
        let mut board = blank(7);
        let green = place(&mut board, 0, 0, GREEN);
        place(&mut board, 0, 3, GREEN);
        place(&mut board, 0, 5, RED);

        let star = board.mint(BubbleKind::Star, Vec2::new(1.0, 2.5));
        let result = board.resolve_landing(star, Contact::Bubble(green));

        // both greens and the star itself
        assert_eq!(result.popped.len(), 3);
        assert_eq!(board.len(), 1);
        assert_eq!(board.colors_on_board(), vec![RED]);
    }

    #[test]
    fn test_star_target_clears_projectile_color() {
        let mut board = blank(7);
        let star = place(&mut board, 0, 0, BubbleKind::Star);
        place(&mut board, 0, 2, RED);
        place(&mut board, 0, 4, RED);
        place(&mut board, 0, 6, GREEN);

        let shot = board.mint(RED, Vec2::new(1.0, 2.8));
        let result = board.resolve_landing(shot, Contact::Bubble(star));
        assert!(result.contains_kind(BubbleKind::Star));
        assert_eq!(result.popped.len(), 4);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_paint_projectile_repaints_neighbors() {
        let mut board = blank(7);
        let center = place(&mut board, 0, 2, BLUE);
        let left = place(&mut board, 0, 1, RED);
        let junk = place(&mut board, 0, 3, BubbleKind::Junk);
        let far = place(&mut board, 0, 5, RED);

        let paint = board.mint(BubbleKind::Paint, Vec2::new(5.0, 2.8));
        let result = board.resolve_landing(paint, Contact::Bubble(center));

        assert_eq!(result.popped.len(), 1);
        assert_eq!(board.get(left).unwrap().kind, BLUE);
        assert_eq!(board.get(junk).unwrap().kind, BubbleKind::Junk);
        assert_eq!(board.get(far).unwrap().kind, RED);
    }

    #[test]
    fn test_paint_target_repaints_and_pops() {
        let mut board = blank(7);
        let paint = place(&mut board, 0, 2, BubbleKind::Paint);
        let neighbor = place(&mut board, 0, 3, BLUE);
        place(&mut board, 0, 0, RED);

        let shot = board.mint(GREEN, Vec2::new(5.0, 2.8));
        let result = board.resolve_landing(shot, Contact::Bubble(paint));

        assert!(result.contains_kind(BubbleKind::Paint));
        assert!(board.get(paint).is_none());
        assert_eq!(board.get(neighbor).unwrap().kind, GREEN);
    }

    #[test]
    fn test_mirror_adopts_color_and_matches() {
        let mut board = blank(7);
        let mirror = place(&mut board, 0, 2, BubbleKind::Mirror);
        place(&mut board, 0, 1, RED);
        place(&mut board, 0, 3, RED);
        place(&mut board, 0, 6, GREEN);

        let shot = board.mint(RED, Vec2::new(5.0, 2.8));
        let result = board.resolve_landing(shot, Contact::Bubble(mirror));

        // mirror plus both reds, then the projectile
        assert_eq!(result.popped.len(), 4);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_mirror_without_match_keeps_new_color() {
        let mut board = blank(7);
        let mirror = place(&mut board, 0, 2, BubbleKind::Mirror);
        place(&mut board, 0, 5, GREEN);

        let shot = board.mint(RED, Vec2::new(5.0, 2.8));
        let result = board.resolve_landing(shot, Contact::Bubble(mirror));

        assert_eq!(result.popped.len(), 1);
        assert_eq!(board.get(mirror).unwrap().kind, RED);
    }

    #[test]
    fn test_ordinary_shot_lands_and_matches() {
        let mut board = blank(7);
        let a = place(&mut board, 0, 0, RED);
        place(&mut board, 0, 1, RED);

        let shot = board.mint(RED, board.lattice().slot(0, 2, false));
        let result = board.resolve_landing(shot, Contact::Bubble(a));
        assert_eq!(result.popped.len(), 3);
        assert!(board.is_empty());
    }

    #[test]
    fn test_detonate_range() {
        let mut board = blank(9);
        place(&mut board, 0, 0, RED);
        place(&mut board, 0, 2, RED);
        let outside = place(&mut board, 0, 5, RED);

        let removed = board.detonate(Vec2::new(1.0, 1.0));
        assert_eq!(removed.len(), 2);
        assert!(board.get(outside).is_some());
    }

    #[test]
    fn test_dropped_bomb_detonates_once() {
        let mut board = blank(9);
        place(&mut board, 0, 0, RED);
        place(&mut board, 0, 1, GREEN);
        let outside = place(&mut board, 0, 7, BLUE);

        let mut result = ClearResult::new();
        let bomb = board.mint(BubbleKind::Bomb, board.lattice().slot(1, 0, true));
        let plain = board.mint(RED, Vec2::new(9.0, 9.0));
        result.dropped = vec![bomb, plain];

        assert_eq!(board.detonate_dropped_bombs(&mut result), 1);
        assert!(result.contains_kind(BubbleKind::Bomb));
        // the bomb plus both top-row neighbours
        assert_eq!(result.popped.len(), 3);
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(board.len(), 1);
        assert!(board.get(outside).is_some());
    }
}
