/// Seeded FNV-1a hasher used to derive a deterministic generation seed from a
/// prompt string.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Hash a prompt into a stable seed. Identical prompts always produce the
/// same seed, which is what makes interpretation and synthesis reproducible.
pub fn prompt_seed(prompt: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(prompt.as_bytes());
    h.finish()
}

/// Minimal deterministic RNG (SplitMix64). Not cryptographic; used only for
/// reproducible procedural choices.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform draw in `[lo, hi)`.
    pub fn next_f64_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }

    /// Uniform integer draw in `[0, n)`; `n` must be non-zero.
    pub fn next_usize(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Stateless bounded noise in `[0, 1)` keyed by `(seed, x)`.
pub fn noise01(seed: u64, x: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep over `[e0, e1]`, clamped.
pub fn smoothstep(e0: f64, e1: f64, x: f64) -> f64 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wrap a value into `[0, 1)`. Negative inputs wrap toward positive.
pub fn fract1(x: f64) -> f64 {
    x - x.floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_seed_is_stable_and_input_sensitive() {
        assert_eq!(prompt_seed("kinetic sand"), prompt_seed("kinetic sand"));
        assert_ne!(prompt_seed("kinetic sand"), prompt_seed("kinetic sanD"));
    }

    #[test]
    fn rng_is_deterministic() {
        let mut a = Rng64::new(123);
        let mut b = Rng64::new(123);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn rng_range_stays_in_bounds() {
        let mut rng = Rng64::new(7);
        for _ in 0..100 {
            let v = rng.next_f64_range(-2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
            let i = rng.next_usize(5);
            assert!(i < 5);
        }
    }

    #[test]
    fn noise_is_bounded_and_deterministic() {
        for x in 0..50 {
            let v = noise01(9, x);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, noise01(9, x));
        }
    }

    #[test]
    fn smoothstep_boundaries() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fract1_wraps_negatives() {
        assert!((fract1(1.25) - 0.25).abs() < 1e-12);
        assert!((fract1(-0.25) - 0.75).abs() < 1e-12);
    }
}
