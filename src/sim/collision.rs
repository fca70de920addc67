//! Projectile motion and contact tests
//!
//! The projectile only ever bounces off the two side walls; everything else
//! is a nearest-neighbour distance check against resting bubbles.

use glam::Vec2;

use super::bubble::{Bubble, BubbleId};

/// What an in-flight bubble touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Leading edge reached the ceiling
    Ceiling,
    /// Nearest resting bubble within one grid spacing
    Bubble(BubbleId),
}

/// Which wall, if any, the projectile bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    Left,
    Right,
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Move a projectile by one step and bounce it off the side walls
///
/// The bubble is clamped back inside so it never leaves the field by more
/// than one step.
pub fn step_projectile(bubble: &mut Bubble, dt: f32, field_width: f32) -> Option<WallHit> {
    bubble.pos += bubble.vel * dt;

    if bubble.pos.x - bubble.radius < 0.0 {
        bubble.vel = reflect_velocity(bubble.vel, Vec2::X);
        bubble.pos.x = bubble.radius;
        return Some(WallHit::Left);
    }
    if bubble.pos.x + bubble.radius > field_width {
        bubble.vel = reflect_velocity(bubble.vel, Vec2::NEG_X);
        bubble.pos.x = field_width - bubble.radius;
        return Some(WallHit::Right);
    }
    None
}

/// Check whether a projectile has reached the ceiling line
#[inline]
pub fn touches_ceiling(bubble: &Bubble, ceiling_y: f32) -> bool {
    bubble.pos.y - bubble.radius <= ceiling_y
}

/// Nearest bubble strictly closer than `reach`; first one wins ties
pub fn nearest_within<'a>(
    pos: Vec2,
    reach: f32,
    bubbles: impl IntoIterator<Item = &'a Bubble>,
) -> Option<&'a Bubble> {
    bubbles
        .into_iter()
        .map(|b| (b, pos.distance(b.pos)))
        .filter(|(_, d)| *d < reach)
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::BubbleKind;

    fn projectile(pos: Vec2, vel: Vec2) -> Bubble {
        let mut b = Bubble::new(BubbleId(0), BubbleKind::Color(0), pos);
        b.vel = vel;
        b
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_left_wall() {
        let mut b = projectile(Vec2::new(1.2, 10.0), Vec2::new(-10.0, -30.0));
        let hit = step_projectile(&mut b, 0.1, 14.0);
        assert_eq!(hit, Some(WallHit::Left));
        assert_eq!(b.pos.x, b.radius);
        assert!(b.vel.x > 0.0);
        assert!(b.vel.y < 0.0);
    }

    #[test]
    fn test_bounce_right_wall() {
        let mut b = projectile(Vec2::new(12.9, 10.0), Vec2::new(10.0, -30.0));
        let hit = step_projectile(&mut b, 0.1, 14.0);
        assert_eq!(hit, Some(WallHit::Right));
        assert_eq!(b.pos.x, 13.0);
        assert!(b.vel.x < 0.0);
    }

    #[test]
    fn test_no_bounce_mid_field() {
        let mut b = projectile(Vec2::new(7.0, 10.0), Vec2::new(1.0, -30.0));
        assert_eq!(step_projectile(&mut b, 0.1, 14.0), None);
        assert!((b.pos.y - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_within_picks_closest() {
        let a = Bubble::new(BubbleId(1), BubbleKind::Color(0), Vec2::new(0.0, 0.0));
        let b = Bubble::new(BubbleId(2), BubbleKind::Color(1), Vec2::new(1.5, 0.0));
        let c = Bubble::new(BubbleId(3), BubbleKind::Color(1), Vec2::new(9.0, 0.0));
        let all = [a, b, c];

        let hit = nearest_within(Vec2::new(1.2, 0.0), 2.0, &all).unwrap();
        assert_eq!(hit.id, BubbleId(2));
        assert!(nearest_within(Vec2::new(5.0, 0.0), 2.0, &all).is_none());
    }
}
