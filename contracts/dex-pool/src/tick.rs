use crate::storage::{get_tick, get_tick_bitmap_word, set_tick, set_tick_bitmap_word};
use dex_math::{compress, position, SwapError, TickLedger};
use soroban_sdk::Env;

/// Apply a liquidity change to one boundary of a position.
/// Returns true if the tick flipped between initialized and empty.
#[allow(clippy::too_many_arguments)]
pub fn update(
    env: &Env,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    fee_growth_global_0_x128: u128,
    fee_growth_global_1_x128: u128,
    upper: bool,
    max_liquidity: u128,
) -> bool {
    let mut info = get_tick(env, tick);

    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = dex_math::add_delta(liquidity_gross_before, liquidity_delta);
    if liquidity_gross_after > max_liquidity {
        panic!("Liquidity overflow");
    }

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    if liquidity_gross_before == 0 {
        // All growth so far is assumed to have happened below the tick
        if tick <= tick_current {
            info.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
            info.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
        }
        info.initialized = true;
    }

    info.liquidity_gross = liquidity_gross_after;
    let liquidity_net = if upper {
        info.liquidity_net.checked_sub(liquidity_delta)
    } else {
        info.liquidity_net.checked_add(liquidity_delta)
    };
    info.liquidity_net = liquidity_net.unwrap_or_else(|| panic!("Liquidity net overflow"));

    set_tick(env, tick, &info);

    flipped
}

/// Flip fee growth outside for a crossed tick and return its liquidity_net
pub fn cross(
    env: &Env,
    tick: i32,
    fee_growth_global_0_x128: u128,
    fee_growth_global_1_x128: u128,
) -> i128 {
    let mut info = get_tick(env, tick);

    info.fee_growth_outside_0_x128 =
        fee_growth_global_0_x128.wrapping_sub(info.fee_growth_outside_0_x128);
    info.fee_growth_outside_1_x128 =
        fee_growth_global_1_x128.wrapping_sub(info.fee_growth_outside_1_x128);

    set_tick(env, tick, &info);

    info.liquidity_net
}

/// Flip a tick's bit in the bitmap
pub fn flip_tick(env: &Env, tick: i32, tick_spacing: i32) {
    if tick % tick_spacing != 0 {
        panic!("Tick not on spacing");
    }

    let (word_pos, bit_pos) = position(compress(tick, tick_spacing));
    let word = get_tick_bitmap_word(env, word_pos);
    set_tick_bitmap_word(env, word_pos, word ^ (1u128 << bit_pos));
}

/// This pool's own ticks as seen by the swap loop.
///
/// A committing ledger persists every crossing; a read-only one reports the
/// same liquidity changes and leaves storage alone.
pub struct PoolLedger<'a> {
    env: &'a Env,
    commit: bool,
}

impl<'a> PoolLedger<'a> {
    pub fn committing(env: &'a Env) -> Self {
        PoolLedger { env, commit: true }
    }

    pub fn read_only(env: &'a Env) -> Self {
        PoolLedger { env, commit: false }
    }
}

impl TickLedger for PoolLedger<'_> {
    fn bitmap_word(&self, word_pos: i32) -> Result<u128, SwapError> {
        Ok(get_tick_bitmap_word(self.env, word_pos))
    }

    fn cross(
        &mut self,
        tick: i32,
        fee_growth_global_0_x128: u128,
        fee_growth_global_1_x128: u128,
    ) -> Result<i128, SwapError> {
        if self.commit {
            Ok(cross(self.env, tick, fee_growth_global_0_x128, fee_growth_global_1_x128))
        } else {
            Ok(get_tick(self.env, tick).liquidity_net)
        }
    }
}
