#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        self.write_u8(0);
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

/// Rotation hash over `(seed, variant, digest)` used by every deterministic selection.
pub(crate) fn rotation_hash(seed: u64, variant_index: u32, digest: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u32(variant_index);
    h.write_str(digest);
    h.finish()
}

/// Step hash over `(digest, variant)`; kept independent of the seed.
pub(crate) fn step_hash(digest: &str, variant_index: u32) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_str(digest);
    h.write_u32(variant_index);
    h.finish()
}

/// Seedable linear-congruential generator.
///
/// The planner creates one per run and threads it explicitly; nothing in the crate reaches
/// for an ambient random source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Multiplier applied to the variant index when deriving a run seed.
    pub const VARIANT_STRIDE: u64 = 9_973;

    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    /// Seed a generator directly.
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ (seed >> 32)) as u32,
        }
    }

    /// Seed a generator for a planning run: `seed + variant_index * VARIANT_STRIDE`.
    pub fn for_run(seed: u64, variant_index: u32) -> Self {
        Self::new(seed.wrapping_add(u64::from(variant_index).wrapping_mul(Self::VARIANT_STRIDE)))
    }

    /// Advance and return the next 32-bit state.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Next index in `[0, len)`; returns 0 for empty ranges.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Discretize a `[0, 1]` value into `bins` buckets.
pub(crate) fn bin(v: f64, bins: u32) -> u32 {
    let b = (clamp01(v) * f64::from(bins)).floor() as u32;
    b.min(bins.saturating_sub(1))
}

pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn centroid(vectors: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut out = vec![0.0; first.len()];
    for v in vectors {
        for (acc, x) in out.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len() as f64;
    for acc in &mut out {
        *acc /= n;
    }
    out
}

/// Round to hundredths; used by canonical signatures.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
