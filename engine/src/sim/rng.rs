// Seeded pseudo-random source for the synthetic price walk.
// Reproducible for a given seed; only meant to look plausible on a chart.

#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Derives a stable seed from an asset id (FNV-1a), kept small enough
    /// that consecutive seeds stay exactly representable as `f64`.
    pub fn seed_for(id: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in id.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash % 1_000_000
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, 1)`; advances the seed by one.
    pub fn next_f64(&mut self) -> f64 {
        let x = (self.seed as f64).sin() * 10_000.0;
        self.seed = self.seed.wrapping_add(1);
        let frac = x - x.floor();
        if frac.is_finite() && frac < 1.0 {
            frac
        } else {
            0.0
        }
    }
}
