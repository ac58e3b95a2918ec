//! Wanderers: slow background drifters that ignore everything else.
//! They change direction at random intervals, sometimes pause, and wrap
//! around every edge of the arena.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{EntityRef, MovingBody};
use super::bounds::{Arena, integrate, wrap_all};
use crate::config::WandererConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wanderer {
    pub id: u32,
    pub body: MovingBody,
    /// Ticks until the next change of direction
    pub redirect_in: u32,
}

impl Wanderer {
    pub fn spawn(id: u32, arena: &Arena, cfg: &WandererConfig, rng: &mut impl Rng) -> Self {
        let pos = Vec2::new(
            rng.random::<f32>() * arena.width,
            rng.random::<f32>() * arena.height,
        );
        Self {
            id,
            body: MovingBody::new(pos, random_drift(cfg, rng), cfg.size * 0.5),
            redirect_in: redirect_delay(cfg, rng),
        }
    }

    #[inline]
    pub fn entity(&self) -> EntityRef {
        EntityRef::Wanderer(self.id)
    }

    pub fn update(&mut self, arena: &Arena, cfg: &WandererConfig, rng: &mut impl Rng, dt: f32) {
        self.redirect_in = self.redirect_in.saturating_sub(1);
        if self.redirect_in == 0 {
            self.body.vel = random_drift(cfg, rng);
            self.redirect_in = redirect_delay(cfg, rng);
        }
        integrate(&mut self.body, dt);
        wrap_all(&mut self.body, arena);
    }
}

fn random_drift(cfg: &WandererConfig, rng: &mut impl Rng) -> Vec2 {
    if rng.random::<f32>() < cfg.pause_chance {
        return Vec2::ZERO;
    }
    Vec2::new(
        (rng.random::<f32>() - 0.5) * cfg.max_drift,
        (rng.random::<f32>() - 0.5) * cfg.max_drift,
    )
}

fn redirect_delay(cfg: &WandererConfig, rng: &mut impl Rng) -> u32 {
    cfg.redirect_min_ticks.max(1) + rng.random_range(0..cfg.redirect_span_ticks.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_drift_is_slow_and_contained() {
        let cfg = WandererConfig::default();
        let arena = Arena::new(800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut w = Wanderer::spawn(1, &arena, &cfg, &mut rng);

        for _ in 0..2000 {
            w.update(&arena, &cfg, &mut rng, 1.0);
            assert!(w.body.vel.x.abs() <= cfg.max_drift * 0.5);
            assert!(w.body.vel.y.abs() <= cfg.max_drift * 0.5);
            assert!(arena.contains(w.body.pos));
        }
    }

    #[test]
    fn test_redirect_delay_range() {
        let cfg = WandererConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..500 {
            let d = redirect_delay(&cfg, &mut rng);
            assert!((180..480).contains(&d));
        }
    }

    #[test]
    fn test_same_seed_same_path() {
        let cfg = WandererConfig::default();
        let arena = Arena::new(800.0, 600.0);
        let mut rng_a = Pcg32::seed_from_u64(42);
        let mut rng_b = Pcg32::seed_from_u64(42);
        let mut a = Wanderer::spawn(1, &arena, &cfg, &mut rng_a);
        let mut b = Wanderer::spawn(1, &arena, &cfg, &mut rng_b);
        for _ in 0..600 {
            a.update(&arena, &cfg, &mut rng_a, 1.0);
            b.update(&arena, &cfg, &mut rng_b, 1.0);
        }
        assert_eq!(a.body.pos, b.body.pos);
    }
}
