//! Ammo selection
//!
//! Special ammo is handed out on a shot-count cadence; everything else is an
//! ordinary colour that can still make a match on the current board.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bubble::BubbleKind;

/// One special kind forced into the ammo stream every `interval` shots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRule {
    pub kind: BubbleKind,
    /// First stage the rule applies on
    pub min_stage: u32,
    /// Ordinary shots between two forced specials
    pub interval: u32,
}

/// Forced-special table, checked in order (first match wins)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoRules {
    pub specials: Vec<SpecialRule>,
}

impl Default for AmmoRules {
    fn default() -> Self {
        Self {
            specials: vec![
                SpecialRule { kind: BubbleKind::Mirror, min_stage: 11, interval: 50 },
                SpecialRule { kind: BubbleKind::Star, min_stage: 7, interval: 100 },
                SpecialRule { kind: BubbleKind::Paint, min_stage: 9, interval: 30 },
                SpecialRule { kind: BubbleKind::Bomb, min_stage: 5, interval: 30 },
            ],
        }
    }
}

/// Ordinary shots fired since each special was last handed out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotCounters {
    pub since_bomb: u32,
    pub since_star: u32,
    pub since_paint: u32,
    pub since_mirror: u32,
}

impl ShotCounters {
    /// Count a fired shot; special shots do not advance the counters
    pub fn record_shot(&mut self, fired: BubbleKind) {
        if fired.is_ordinary() {
            self.since_bomb += 1;
            self.since_star += 1;
            self.since_paint += 1;
            self.since_mirror += 1;
        }
    }

    pub fn get(&self, kind: BubbleKind) -> Option<u32> {
        match kind {
            BubbleKind::Bomb => Some(self.since_bomb),
            BubbleKind::Star => Some(self.since_star),
            BubbleKind::Paint => Some(self.since_paint),
            BubbleKind::Mirror => Some(self.since_mirror),
            _ => None,
        }
    }

    fn slot_mut(&mut self, kind: BubbleKind) -> Option<&mut u32> {
        match kind {
            BubbleKind::Bomb => Some(&mut self.since_bomb),
            BubbleKind::Star => Some(&mut self.since_star),
            BubbleKind::Paint => Some(&mut self.since_paint),
            BubbleKind::Mirror => Some(&mut self.since_mirror),
            _ => None,
        }
    }
}

/// Pick the next ammo kind
///
/// A due special wins (and resets its counter). Otherwise a colour present on
/// the board and allowed on the stage is drawn uniformly; if none qualifies
/// the board colours, then the allowed colours, are used instead.
pub fn draw_ammo<R: Rng + ?Sized>(
    rules: &AmmoRules,
    counters: &mut ShotCounters,
    stage: u32,
    on_board: &[BubbleKind],
    allowed: &[BubbleKind],
    rng: &mut R,
) -> BubbleKind {
    for rule in &rules.specials {
        if stage < rule.min_stage {
            continue;
        }
        if let Some(count) = counters.slot_mut(rule.kind) {
            if *count >= rule.interval {
                *count = 0;
                return rule.kind;
            }
        }
    }

    let mut pool: Vec<BubbleKind> = on_board
        .iter()
        .copied()
        .filter(|k| allowed.contains(k))
        .collect();
    if pool.is_empty() {
        pool = if on_board.is_empty() {
            allowed.to_vec()
        } else {
            on_board.to_vec()
        };
    }
    if pool.is_empty() {
        return BubbleKind::Color(0);
    }
    pool[rng.random_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::stage_colors;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const RED: BubbleKind = BubbleKind::Color(0);
    const GREEN: BubbleKind = BubbleKind::Color(1);
    const BLUE: BubbleKind = BubbleKind::Color(2);

    #[test]
    fn test_bomb_after_thirty_plain_shots() {
        // early-stage rules with the bomb unlocked from stage 1
        let rules = AmmoRules {
            specials: vec![SpecialRule { kind: BubbleKind::Bomb, min_stage: 1, interval: 30 }],
        };
        let mut counters = ShotCounters::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let board = [RED, GREEN];

        for _ in 0..30 {
            let kind = draw_ammo(&rules, &mut counters, 1, &board, &stage_colors(1), &mut rng);
            assert!(kind.is_ordinary());
            counters.record_shot(kind);
        }
        assert_eq!(counters.since_bomb, 30);

        let next = draw_ammo(&rules, &mut counters, 1, &board, &stage_colors(1), &mut rng);
        assert_eq!(next, BubbleKind::Bomb);
        assert_eq!(counters.since_bomb, 0);
    }

    #[test]
    fn test_default_rules_gate_bomb_by_stage() {
        let rules = AmmoRules::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut counters = ShotCounters { since_bomb: 30, ..Default::default() };

        let kind = draw_ammo(&rules, &mut counters, 1, &[RED], &stage_colors(1), &mut rng);
        assert!(kind.is_ordinary());
        assert_eq!(counters.since_bomb, 30);

        let kind = draw_ammo(&rules, &mut counters, 5, &[RED], &stage_colors(5), &mut rng);
        assert_eq!(kind, BubbleKind::Bomb);
    }

    #[test]
    fn test_priority_mirror_first() {
        let rules = AmmoRules::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut counters = ShotCounters {
            since_bomb: 30,
            since_star: 100,
            since_paint: 30,
            since_mirror: 50,
        };
        let order: Vec<BubbleKind> = (0..4)
            .map(|_| draw_ammo(&rules, &mut counters, 12, &[RED], &stage_colors(12), &mut rng))
            .collect();
        assert_eq!(
            order,
            vec![BubbleKind::Mirror, BubbleKind::Star, BubbleKind::Paint, BubbleKind::Bomb]
        );
    }

    #[test]
    fn test_special_shots_do_not_count() {
        let mut counters = ShotCounters::default();
        counters.record_shot(BubbleKind::Bomb);
        counters.record_shot(RED);
        assert_eq!(counters.get(BubbleKind::Bomb), Some(1));
        assert_eq!(counters.get(BubbleKind::Chest), None);
    }

    #[test]
    fn test_color_pool_fallbacks() {
        let rules = AmmoRules::default();
        let mut counters = ShotCounters::default();
        let mut rng = Pcg32::seed_from_u64(4);

        // intersection
        for _ in 0..20 {
            let kind = draw_ammo(&rules, &mut counters, 1, &[GREEN, BLUE], &[RED, GREEN], &mut rng);
            assert_eq!(kind, GREEN);
        }
        // disjoint: board colours win
        let kind = draw_ammo(&rules, &mut counters, 1, &[BLUE], &[RED, GREEN], &mut rng);
        assert_eq!(kind, BLUE);
        // empty board: allowed colours
        let kind = draw_ammo(&rules, &mut counters, 1, &[], &[RED], &mut rng);
        assert_eq!(kind, RED);
    }
}
