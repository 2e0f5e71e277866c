//! Spin physics and the Idle/Spinning/Celebrating state machine.

use std::f64::consts::TAU;

use rand::Rng;

use crate::config::{SpinTuning, MIN_SEGMENTS_DUAL, MIN_SEGMENTS_SINGLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Spinning,
    Celebrating,
}

/// How many winners a spin draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickCount {
    #[default]
    One,
    Two,
}

impl PickCount {
    pub const fn min_segments(self) -> usize {
        match self {
            PickCount::One => MIN_SEGMENTS_SINGLE,
            PickCount::Two => MIN_SEGMENTS_DUAL,
        }
    }
}

/// Why a spin request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinRejected {
    NotIdle(SessionState),
    TooFewSegments { have: usize, need: usize },
}

/// Result of advancing the wheel by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStep {
    /// Nothing in motion.
    Resting,
    /// Still decelerating; `crossed` is set when a new segment reached the pointer.
    Coasting { crossed: bool },
    /// The wheel has stopped. Reported once per spin.
    Landed { index: usize },
}

/// Index of the segment under `pointer` for a wheel turned by `rotation`.
pub fn index_under_pointer(pointer: f64, rotation: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let per_segment = TAU / count as f64;
    let raw = ((pointer - rotation) / per_segment).floor() as i64;
    raw.rem_euclid(count as i64) as usize
}

/// Draw a second winner uniformly from every index except `primary`.
pub fn pick_second<R: Rng + ?Sized>(primary: usize, count: usize, rng: &mut R) -> Option<usize> {
    if count < 2 {
        return None;
    }
    let offset = rng.random_range(0..count - 1);
    Some(if offset >= primary { offset + 1 } else { offset })
}

#[derive(Debug, Clone)]
pub struct SpinEngine {
    tuning: SpinTuning,
    state: SessionState,
    rotation: f64,
    velocity: f64,
    last_tick_index: Option<usize>,
}

impl SpinEngine {
    pub fn new(tuning: SpinTuning) -> Self {
        Self {
            tuning,
            state: SessionState::Idle,
            rotation: 0.0,
            velocity: 0.0,
            last_tick_index: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Accumulated rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn tuning(&self) -> &SpinTuning {
        &self.tuning
    }

    /// Start a spin, seeding the velocity. Returns the seeded velocity.
    pub fn request_spin<R: Rng + ?Sized>(
        &mut self,
        segment_count: usize,
        pick: PickCount,
        rng: &mut R,
    ) -> Result<f64, SpinRejected> {
        if self.state != SessionState::Idle {
            return Err(SpinRejected::NotIdle(self.state));
        }
        let need = pick.min_segments();
        if segment_count < need {
            return Err(SpinRejected::TooFewSegments {
                have: segment_count,
                need,
            });
        }

        let (lo, hi) = (self.tuning.min_velocity, self.tuning.max_velocity);
        self.velocity = if hi > lo { rng.random_range(lo..hi) } else { lo };
        self.state = SessionState::Spinning;
        Ok(self.velocity)
    }

    /// Advance one frame.
    pub fn step(&mut self, segment_count: usize) -> SpinStep {
        if self.state != SessionState::Spinning {
            return SpinStep::Resting;
        }
        if segment_count == 0 {
            self.force_idle();
            return SpinStep::Resting;
        }

        if self.velocity > self.tuning.epsilon {
            self.rotation = (self.rotation + self.velocity) % TAU;
            self.velocity *= self.tuning.decay;

            let under = self.current_index(segment_count);
            let crossed =
                self.velocity > self.tuning.epsilon && self.last_tick_index != Some(under);
            if crossed {
                self.last_tick_index = Some(under);
            }
            return SpinStep::Coasting { crossed };
        }

        self.velocity = 0.0;
        self.state = SessionState::Celebrating;
        SpinStep::Landed {
            index: self.current_index(segment_count),
        }
    }

    pub fn current_index(&self, segment_count: usize) -> usize {
        index_under_pointer(self.tuning.pointer_angle, self.rotation, segment_count)
    }

    /// Celebrating -> Idle. Other states are left alone.
    pub fn settle(&mut self) -> bool {
        if self.state == SessionState::Celebrating {
            self.state = SessionState::Idle;
            true
        } else {
            false
        }
    }

    /// Stop any motion and return to Idle.
    pub fn force_idle(&mut self) {
        self.velocity = 0.0;
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_to_landing(engine: &mut SpinEngine, count: usize) -> (usize, usize) {
        let mut ticks = 0;
        for _ in 0..100_000 {
            match engine.step(count) {
                SpinStep::Coasting { crossed } => ticks += crossed as usize,
                SpinStep::Landed { index } => return (index, ticks),
                SpinStep::Resting => panic!("engine rested before landing"),
            }
        }
        panic!("spin never landed");
    }

    #[test]
    fn pointer_index_matches_floor_formula() {
        let per = TAU / 4.0;
        assert_eq!(index_under_pointer(0.0, 0.0, 4), 0);
        // Rotating forward moves earlier segments under a fixed pointer.
        assert_eq!(index_under_pointer(0.0, 0.1, 4), 3);
        assert_eq!(index_under_pointer(0.0, per + 0.1, 4), 2);
        assert_eq!(index_under_pointer(0.0, -0.1, 4), 0);
        assert_eq!(index_under_pointer(0.0, -per - 0.1, 4), 1);
        assert_eq!(index_under_pointer(0.0, 5.0 * TAU + 0.1, 4), 3);
    }

    #[test]
    fn spin_rejected_with_too_few_segments() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = SpinEngine::new(SpinTuning::default());
        assert_eq!(
            engine.request_spin(1, PickCount::One, &mut rng),
            Err(SpinRejected::TooFewSegments { have: 1, need: 2 })
        );
        assert_eq!(
            engine.request_spin(2, PickCount::Two, &mut rng),
            Err(SpinRejected::TooFewSegments { have: 2, need: 3 })
        );
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.velocity(), 0.0);
    }

    #[test]
    fn spin_rejected_unless_idle() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut engine = SpinEngine::new(SpinTuning::default());
        engine.request_spin(3, PickCount::One, &mut rng).unwrap();
        let velocity = engine.velocity();
        assert_eq!(
            engine.request_spin(3, PickCount::One, &mut rng),
            Err(SpinRejected::NotIdle(SessionState::Spinning))
        );
        assert_eq!(engine.velocity(), velocity);
    }

    #[test]
    fn seeded_velocity_stays_in_range() {
        let tuning = SpinTuning::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let mut engine = SpinEngine::new(tuning);
            let v = engine.request_spin(5, PickCount::One, &mut rng).unwrap();
            assert!(v >= tuning.min_velocity && v < tuning.max_velocity);
        }
    }

    #[test]
    fn landing_is_reported_once_and_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut engine = SpinEngine::new(SpinTuning::default());
        engine.request_spin(7, PickCount::One, &mut rng).unwrap();

        let (index, ticks) = run_to_landing(&mut engine, 7);
        assert!(index < 7);
        assert!(ticks > 0);
        assert_eq!(engine.state(), SessionState::Celebrating);
        assert_eq!(index, engine.current_index(7));

        for _ in 0..10 {
            assert_eq!(engine.step(7), SpinStep::Resting);
        }
    }

    #[test]
    fn velocity_decays_exponentially() {
        let tuning = SpinTuning::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut engine = SpinEngine::new(tuning);
        let v0 = engine.request_spin(4, PickCount::One, &mut rng).unwrap();
        engine.step(4);
        engine.step(4);
        let expected = v0 * tuning.decay * tuning.decay;
        assert!((engine.velocity() - expected).abs() < 1e-12);
    }

    #[test]
    fn ticks_only_fire_on_segment_change() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut engine = SpinEngine::new(SpinTuning::default());
        engine.request_spin(2, PickCount::One, &mut rng).unwrap();

        let mut previous = None;
        loop {
            match engine.step(2) {
                SpinStep::Coasting { crossed } => {
                    let now = engine.current_index(2);
                    if crossed {
                        assert_ne!(previous, Some(now));
                        previous = Some(now);
                    } else if engine.velocity() > engine.tuning().epsilon {
                        assert_eq!(previous, Some(now));
                    }
                }
                SpinStep::Landed { .. } => break,
                SpinStep::Resting => unreachable!(),
            }
        }
    }

    #[test]
    fn settle_and_force_idle() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = SpinEngine::new(SpinTuning::default());
        assert!(!engine.settle());

        engine.request_spin(3, PickCount::Two, &mut rng).unwrap();
        assert!(!engine.settle());
        run_to_landing(&mut engine, 3);
        assert!(engine.settle());
        assert_eq!(engine.state(), SessionState::Idle);

        engine.request_spin(3, PickCount::One, &mut rng).unwrap();
        engine.force_idle();
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.velocity(), 0.0);
    }

    #[test]
    fn losing_all_segments_mid_spin_goes_idle() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut engine = SpinEngine::new(SpinTuning::default());
        engine.request_spin(3, PickCount::One, &mut rng).unwrap();
        assert_eq!(engine.step(0), SpinStep::Resting);
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn second_pick_is_distinct_and_covers_the_rest() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [0usize; 5];
        for _ in 0..2_000 {
            let second = pick_second(2, 5, &mut rng).unwrap();
            assert_ne!(second, 2);
            seen[second] += 1;
        }
        assert_eq!(seen[2], 0);
        assert!(seen.iter().enumerate().all(|(i, n)| i == 2 || *n > 0));
        assert_eq!(pick_second(0, 1, &mut rng), None);
    }
}
