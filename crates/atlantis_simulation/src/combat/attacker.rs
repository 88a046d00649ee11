//! Attacker component - характеристики атакующего актора
//!
//! Урон за удар = base_damage + weapon_bonus (экипированное оружие).
//! Inventory/equipment вне симуляции: бонус пишет внешний слой.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Attacker {
    /// Базовый урон персонажа
    pub base_damage: u32,

    /// Бонус экипированного оружия (0 без оружия)
    pub weapon_bonus: u32,

    /// Радиус hit sweep вокруг атакующего (units)
    pub attack_radius: f32,
}

impl Default for Attacker {
    fn default() -> Self {
        Self {
            base_damage: 25,
            weapon_bonus: 0,
            attack_radius: 200.0,
        }
    }
}

impl Attacker {
    pub fn total_damage(&self) -> u32 {
        self.base_damage.saturating_add(self.weapon_bonus)
    }
}
