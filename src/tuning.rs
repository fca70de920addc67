//! Data-driven game balance
//!
//! Every field has a default, so a tuning file only needs the values it
//! changes.

use serde::{Deserialize, Serialize};

use crate::sim::AmmoRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Single-player projectile speed (board units/s)
    pub projectile_speed: f32,
    /// Versus projectile speed (board units/s)
    pub versus_projectile_speed: f32,
    /// Seconds between versus pressure rows
    pub pressure_interval: f32,
    /// Seconds between board previews sent to the opponent
    pub state_push_interval: f32,
    /// Charge needed before an attack is sent
    pub attack_threshold: u32,
    /// Share of the charge converted into junk
    pub attack_ratio: f32,
    /// Pre-generated versus ammo per round
    pub ammo_queue_len: usize,
    /// Rounds needed to win a versus match
    pub rounds_to_win: u32,
    /// Hard cap on rounds in a match
    pub max_rounds: u32,
    pub ammo: AmmoRules,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            projectile_speed: 40.0,
            versus_projectile_speed: 60.0,
            pressure_interval: 10.0,
            state_push_interval: 0.5,
            attack_threshold: 6,
            attack_ratio: 0.75,
            ammo_queue_len: 500,
            rounds_to_win: 5,
            max_rounds: 9,
            ammo: AmmoRules::default(),
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Junk rows sent for a given charge, `None` below the threshold
    pub fn attack_size(&self, charge: u32) -> Option<u32> {
        if charge < self.attack_threshold {
            return None;
        }
        Some((charge as f32 * self.attack_ratio).floor() as u32)
    }
}
