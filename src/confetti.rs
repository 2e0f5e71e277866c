//! Falling confetti shown while winners are on screen.

use rand::Rng;

use crate::config::Color;

const COLORS: [Color; 5] = [
    Color::from_hex(0xef4444),
    Color::from_hex(0x3b82f6),
    Color::from_hex(0x10b981),
    Color::from_hex(0xf59e0b),
    Color::from_hex(0x8b5cf6),
];

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub drift: f64,
    pub color: Color,
    pub tilt: f64,
    pub tilt_angle: f64,
    pub tilt_step: f64,
}

impl Particle {
    /// The short stroke this particle draws, as two endpoints.
    pub fn stroke(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.x + self.tilt + self.size / 3.0, self.y),
            (self.x + self.tilt, self.y + self.tilt + self.size / 5.0),
        )
    }
}

#[derive(Debug, Default)]
pub struct Confetti {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl Confetti {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any particles with a fresh burst above the top edge.
    pub fn burst<R: Rng + ?Sized>(&mut self, count: usize, width: usize, height: usize, rng: &mut R) {
        self.width = width as f64;
        self.height = height as f64;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.random_range(0.0..self.width.max(1.0)),
                y: rng.random_range(0.0..self.height.max(1.0)) - self.height,
                size: rng.random_range(4.0..10.0),
                drift: rng.random_range(0.0..150.0),
                color: COLORS[rng.random_range(0..COLORS.len())],
                tilt: rng.random_range(-10.0..0.0),
                tilt_angle: 0.0,
                tilt_step: rng.random_range(0.05..0.12),
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Fall, sway, and wrap particles that leave the bottom edge.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for p in &mut self.particles {
            p.tilt_angle += p.tilt_step;
            p.y += (p.drift.cos() + 3.0 + p.size / 2.0) / 2.0;
            p.tilt = p.tilt_angle.sin() * 15.0;

            if p.y > self.height {
                p.y = -20.0;
                p.x = rng.random_range(0.0..self.width.max(1.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn burst_starts_above_the_screen() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut confetti = Confetti::new();
        confetti.burst(150, 800, 600, &mut rng);
        assert_eq!(confetti.particles().len(), 150);
        assert!(confetti.particles().iter().all(|p| p.y <= 0.0 && p.x < 800.0));
        assert!(confetti.is_active());
    }

    #[test]
    fn particles_fall_and_wrap() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut confetti = Confetti::new();
        confetti.burst(20, 200, 100, &mut rng);
        let before: Vec<f64> = confetti.particles().iter().map(|p| p.y).collect();
        confetti.update(&mut rng);
        for (p, y0) in confetti.particles().iter().zip(before) {
            assert!(p.y > y0);
        }
        for _ in 0..500 {
            confetti.update(&mut rng);
        }
        assert!(confetti.particles().iter().all(|p| p.y <= 100.0));

        confetti.clear();
        assert!(!confetti.is_active());
    }
}
