use rand::{Error, RngCore};

/// Extra stream values generated past a target index so the terminal draw and
/// any lookahead around it can still resolve.
pub const STREAM_MARGIN: u32 = 64;

/// 32-bit xorshift (13, 17, 15). A zero seed is remapped to 1 since zero is the
/// generator's fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    #[inline]
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Advance once and return the new state.
    #[inline]
    pub fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 15;
        self.state = x;
        x
    }
}

impl Iterator for Xorshift32 {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        Some(self.step())
    }
}

impl RngCore for Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.step());
        let lo = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Materialize the first `count` values emitted from `seed`.
/// The seed itself is not part of the output; index 0 is the first step.
pub fn generate(seed: u32, count: u32) -> Vec<u32> {
    Xorshift32::new(seed).take(count as usize).collect()
}

/// Immutable finite prefix of the seed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedStream {
    seed: u32,
    values: Vec<u32>,
}

impl SeedStream {
    pub fn generate(seed: u32, count: u32) -> Self {
        Self {
            seed,
            values: generate(seed, count),
        }
    }

    /// Prefix long enough to resolve draws up to and just past `target`.
    pub fn for_target(seed: u32, target: u32) -> Self {
        Self::generate(seed, target.saturating_add(STREAM_MARGIN))
    }

    /// Wrap externally produced values (fixtures, captured streams).
    pub fn from_values(seed: u32, values: Vec<u32>) -> Self {
        Self { seed, values }
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<u32> {
        self.values.get(index as usize).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
