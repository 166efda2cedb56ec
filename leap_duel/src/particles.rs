//! Collision sparkle: short-lived particles where the two hands touch.

use rand::Rng;

/// Per-axis screen distance (px) under which a local and a remote joint
/// collide.
pub const COLLIDE_PX: f32 = 10.0;
/// Particles spawned per collision.
pub const BURST: usize = 10;
/// Life lost per tick; a particle starts at 1.0.
pub const DECAY: f32 = 0.2;

const MAX_SPEED: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x:    f32,
    pub y:    f32,
    pub vx:   f32,
    pub vy:   f32,
    pub life: f32,
}

#[derive(Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn burst<R: Rng>(&mut self, x: f32, y: f32, rng: &mut R) {
        for _ in 0..BURST {
            self.particles.push(Particle {
                x,
                y,
                vx:   rng.random_range(-MAX_SPEED..MAX_SPEED),
                vy:   rng.random_range(-MAX_SPEED..MAX_SPEED),
                life: 1.0,
            });
        }
    }

    /// One burst per local joint whose box of half-width [`COLLIDE_PX`]
    /// holds any remote joint.  Points are in screen pixels.  Returns the number of
    /// collisions found.
    pub fn collide<R: Rng>(
        &mut self,
        local:  &[(f32, f32)],
        remote: &[(f32, f32)],
        rng:    &mut R,
    ) -> usize {
        let mut hits = 0;
        for &(lx, ly) in local {
            let touching = remote
                .iter()
                .any(|&(rx, ry)| (lx - rx).abs() < COLLIDE_PX && (ly - ry).abs() < COLLIDE_PX);
            if touching {
                self.burst(lx, ly, rng);
                hits += 1;
            }
        }
        hits
    }

    /// Move every particle and age it; dead ones are dropped.
    pub fn tick(&mut self) {
        for p in self.particles.iter_mut() {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= DECAY;
        }
        self.particles.retain(|p| p.life > 1e-4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn near_joints_spawn_a_burst() {
        let mut field = ParticleField::default();
        let hits = field.collide(&[(100.0, 100.0)], &[(105.0, 104.0)], &mut rng());
        assert_eq!(hits, 1);
        assert_eq!(field.particles().len(), BURST);
        assert!(field.particles().iter().all(|p| p.vx.abs() <= MAX_SPEED && p.vy.abs() <= MAX_SPEED));
    }

    #[test]
    fn distant_joints_do_nothing() {
        let mut field = ParticleField::default();
        assert_eq!(field.collide(&[(0.0, 0.0)], &[(10.0, 0.0), (50.0, 50.0)], &mut rng()), 0);
        assert!(field.is_empty());
    }

    #[test]
    fn collision_zone_is_a_box() {
        let mut field = ParticleField::default();
        // Diagonal offset past the 10 px radius but inside the box.
        assert_eq!(field.collide(&[(0.0, 0.0)], &[(9.0, 9.0)], &mut rng()), 1);
        assert_eq!(field.collide(&[(0.0, 0.0)], &[(9.0, 10.0)], &mut rng()), 0);
    }

    #[test]
    fn one_burst_per_local_joint() {
        let mut field = ParticleField::default();
        let local = [(0.0, 0.0), (200.0, 200.0)];
        let remote = [(1.0, 1.0), (2.0, 2.0), (201.0, 199.0)];
        assert_eq!(field.collide(&local, &remote, &mut rng()), 2);
        assert_eq!(field.particles().len(), 2 * BURST);
    }

    #[test]
    fn particles_fade_out_after_five_ticks() {
        let mut field = ParticleField::default();
        field.burst(10.0, 10.0, &mut rng());
        for _ in 0..4 {
            field.tick();
            assert_eq!(field.particles().len(), BURST);
        }
        field.tick();
        assert!(field.is_empty());
    }

    #[test]
    fn tick_moves_by_velocity() {
        let mut field = ParticleField::default();
        field.burst(50.0, 50.0, &mut rng());
        let before = field.particles()[0];
        field.tick();
        let after = field.particles()[0];
        assert!((after.x - (before.x + before.vx)).abs() < 1e-6);
        assert!((after.life - 0.8).abs() < 1e-6);
    }
}
