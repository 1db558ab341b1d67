//! # engine::entropy
//!
//! Injected sources of nondeterminism.
//!
//! The Confidence Engine reads the wall clock (trading session) and a random
//! source (simulated confluence); the simulator draws latency, fill outcome,
//! ticket and slippage.  Both go through these traits so production wires the
//! real implementations and tests pin them.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

// ─── Clock ────────────────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ─── Random Source ────────────────────────────────────────────────────────────

/// Uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator: same seed, same sequence.
#[derive(Debug)]
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }
}

/// Replays a fixed script of draws, cycling when exhausted.
#[cfg(test)]
#[derive(Debug)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty(), "script needs at least one draw");
        Self {
            draws: draws.to_vec(),
            cursor: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(&[value])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        let i = self.cursor.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.draws[i % self.draws.len()]
    }
}
