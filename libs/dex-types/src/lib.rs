#![no_std]

mod pool;
mod position;
mod tick;

pub use pool::*;
pub use position::*;
pub use tick::*;

/// Q96 constant (2^96) for fixed-point math
pub const Q96: u128 = 1 << 96;

/// Minimum tick index
/// Limited by u128 representation (originally -887272 for uint160)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
/// Limited by u128 representation (originally 887272 for uint160)
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price, `get_sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: u128 = 18447090764788882728;

/// Maximum sqrt price, `get_sqrt_ratio_at_tick(MAX_TICK)`
pub const MAX_SQRT_RATIO: u128 = 340275971719517849884101479065584693834;

/// Maximum number of initialized ticks a single swap may cross.
///
/// Each crossing rewrites one tick entry and Soroban caps a transaction at
/// 50 written entries. Swaps that would cross more ticks are partially
/// filled; quotes observe the same cap.
pub const MAX_TICK_CROSSINGS_PER_SWAP: u32 = 40;

/// Fee amount in hundredths of a basis point (1e-6)
/// 500 = 0.05%, 3000 = 0.3%, 10000 = 1%
pub type Fee = u32;

/// Fee tiers every registry enables at initialization, with their tick spacing
pub const DEFAULT_FEE_TIERS: [(Fee, i32); 3] = [
    (500, 10),    // 0.05%
    (3000, 60),   // 0.3%
    (10000, 200), // 1%
];

/// Calculate maximum liquidity per tick for a given tick spacing
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}
