//! Initial ore endowment.
//!
//! A world asks its [`OreGenerator`] once per tile at creation time. The
//! default [`NoiseOreGenerator`] lays down patches of value noise, one noise
//! channel per ore, and keeps only the richest ore on each tile.

use crate::grid::{OreKind, OreStock, TilePos};
use crate::rng::Xor128;

/// Supplies the starting ore stock of each tile.
pub trait OreGenerator {
    fn ore_at(&self, pos: TilePos) -> OreStock;
}

impl<F> OreGenerator for F
where
    F: Fn(TilePos) -> OreStock,
{
    fn ore_at(&self, pos: TilePos) -> OreStock {
        self(pos)
    }
}

// ---------------------------------------------------------------------------
// Lattice hash
// ---------------------------------------------------------------------------

const CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// CRC32 over a handful of words, folding each word in four times with a
/// growing right shift so that all of its low bits reach the state.
fn lattice_hash(words: &[u32]) -> u32 {
    let mut crc = u32::MAX;
    for &word in words {
        for shift in 0..4 {
            crc = (crc >> 8) ^ CRC_TABLE[((crc ^ (word >> shift)) & 0xFF) as usize];
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// Noise generator
// ---------------------------------------------------------------------------

const OCTAVES: u32 = 3;
const PERSISTENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseOreGenerator {
    seed: u32,
}

impl NoiseOreGenerator {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn channel(kind: OreKind) -> u32 {
        match kind {
            OreKind::Iron => 8,
            OreKind::Copper => 9,
            OreKind::Coal => 10,
        }
    }

    /// Random value at an integer lattice point.
    fn lattice(&self, x: i32, y: i32, channel: u32) -> f64 {
        let seed = lattice_hash(&[x as u32, y as u32, channel, self.seed]);
        Xor128::new(seed).next_f64()
    }

    /// Smoothed value noise in `[0, 1]`, coarsest octave weighted most.
    pub fn sample(&self, pos: TilePos, channel: u32) -> f64 {
        let mut sum = 0.0;
        let mut weight_total = 0.0;
        let mut weight = 1.0;
        for octave in (0..OCTAVES).rev() {
            let cell = 1i32 << octave;
            let (cx, cy) = (pos.x.div_euclid(cell), pos.y.div_euclid(cell));
            let fx = f64::from(pos.x.rem_euclid(cell)) / f64::from(cell);
            let fy = f64::from(pos.y.rem_euclid(cell)) / f64::from(cell);
            let a00 = self.lattice(cx, cy, channel);
            let a10 = self.lattice(cx + 1, cy, channel);
            let a01 = self.lattice(cx, cy + 1, channel);
            let a11 = self.lattice(cx + 1, cy + 1, channel);
            let top = a00 * (1.0 - fx) + a10 * fx;
            let bottom = a01 * (1.0 - fx) + a11 * fx;
            sum += (top * (1.0 - fy) + bottom * fy) * weight;
            weight_total += weight;
            weight *= PERSISTENCE;
        }
        sum / weight_total
    }

    /// Thresholded amount of one ore before the dominant-ore pick.
    fn raw_amount(&self, pos: TilePos, kind: OreKind) -> u32 {
        let n = self.sample(pos, Self::channel(kind));
        let amount = match kind {
            OreKind::Iron | OreKind::Copper => n * 4000.0 - 3000.0,
            OreKind::Coal => n * 2000.0 - 1500.0,
        };
        amount.round().max(0.0) as u32
    }
}

impl OreGenerator for NoiseOreGenerator {
    fn ore_at(&self, pos: TilePos) -> OreStock {
        let mut best: Option<(OreKind, u32)> = None;
        for kind in OreKind::PRIORITY {
            let amount = self.raw_amount(pos, kind);
            if amount > 0 && best.is_none_or(|(_, top)| top < amount) {
                best = Some((kind, amount));
            }
        }
        let mut stock = OreStock::default();
        if let Some((kind, amount)) = best {
            *stock.get_mut(kind) = amount;
        }
        stock
    }
}
