use crate::full_math::{q128, to_u128};
use crate::liquidity_math::checked_add_delta;
use crate::swap_math::compute_swap_step;
use crate::tick_bitmap::next_initialized_tick_within_one_word;
use crate::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use dex_types::{
    Fee, PoolState, SwapComputation, SwapParams, SwapState, MAX_SQRT_RATIO, MAX_TICK,
    MIN_SQRT_RATIO, MIN_TICK,
};
use soroban_sdk::{Env, U256};

/// Ways the swap loop can stop without producing a result
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwapError {
    /// amount_specified was zero
    ZeroAmount,
    /// Price limit on the wrong side of the current price or out of bounds
    InvalidPriceLimit,
    /// An amount or liquidity no longer fits its type
    AmountOverflow,
    /// More loop iterations were needed than `max_steps` allows
    StepBudgetExceeded,
    /// The ledger could not supply a bitmap word or tick
    LedgerUnavailable,
}

/// Tick storage seen by the swap loop.
///
/// The pool's ledger writes crossings through to storage; read-only ledgers
/// only report the liquidity change.
pub trait TickLedger {
    /// Bitmap word at `word_pos`, zero when nothing is initialized there
    fn bitmap_word(&self, word_pos: i32) -> Result<u128, SwapError>;

    /// Cross an initialized tick with the given global fee growth and return
    /// its `liquidity_net`
    fn cross(
        &mut self,
        tick: i32,
        fee_growth_global_0_x128: u128,
        fee_growth_global_1_x128: u128,
    ) -> Result<i128, SwapError>;
}

/// Replace the zero sentinel with the loosest limit in the swap direction
pub fn resolve_price_limit(zero_for_one: bool, sqrt_price_limit_x96: u128) -> u128 {
    match (sqrt_price_limit_x96, zero_for_one) {
        (0, true) => MIN_SQRT_RATIO + 1,
        (0, false) => MAX_SQRT_RATIO - 1,
        (limit, _) => limit,
    }
}

/// Run a swap against `pool` without touching pool state.
///
/// The loop advances one initialized tick (or one bitmap word) per step until
/// the amount is used up, the price limit is reached, or `max_crossings`
/// initialized ticks have been crossed. Crossings go through `ledger`, which
/// decides whether they are persisted.
pub fn compute_swap<L: TickLedger>(
    env: &Env,
    ledger: &mut L,
    pool: &PoolState,
    tick_spacing: i32,
    fee: Fee,
    params: &SwapParams,
) -> Result<SwapComputation, SwapError> {
    if params.amount_specified == 0 {
        return Err(SwapError::ZeroAmount);
    }

    let zero_for_one = params.zero_for_one;
    let limit = params.sqrt_price_limit_x96;
    let limit_ok = if zero_for_one {
        limit < pool.sqrt_price_x96 && limit > MIN_SQRT_RATIO
    } else {
        limit > pool.sqrt_price_x96 && limit < MAX_SQRT_RATIO
    };
    if !limit_ok {
        return Err(SwapError::InvalidPriceLimit);
    }

    let exact_input = params.amount_specified > 0;
    let mut state = SwapState {
        amount_remaining: params.amount_specified,
        amount_calculated: 0,
        sqrt_price_x96: pool.sqrt_price_x96,
        tick: pool.tick,
        liquidity: pool.liquidity,
        fee_growth_global_x128: if zero_for_one {
            pool.fee_growth_global_0_x128
        } else {
            pool.fee_growth_global_1_x128
        },
    };
    let mut ticks_crossed = 0u32;
    let mut steps = 0u32;

    while state.amount_remaining != 0
        && state.sqrt_price_x96 != limit
        && ticks_crossed < params.max_crossings
    {
        if steps >= params.max_steps {
            return Err(SwapError::StepBudgetExceeded);
        }
        steps += 1;

        let step_start_x96 = state.sqrt_price_x96;
        let (tick_next, initialized) = next_initialized_tick_within_one_word(
            |word_pos| ledger.bitmap_word(word_pos),
            state.tick,
            tick_spacing,
            zero_for_one,
        )?;
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(env, tick_next);

        let target = if zero_for_one {
            sqrt_price_next_x96.max(limit)
        } else {
            sqrt_price_next_x96.min(limit)
        };

        let step = compute_swap_step(
            env,
            state.sqrt_price_x96,
            target,
            state.liquidity,
            state.amount_remaining,
            fee,
        );
        state.sqrt_price_x96 = step.sqrt_price_next_x96;

        let paid = to_amount(
            step.amount_in
                .checked_add(step.fee_amount)
                .ok_or(SwapError::AmountOverflow)?,
        )?;
        let received = to_amount(step.amount_out)?;
        if exact_input {
            state.amount_remaining = checked(state.amount_remaining.checked_sub(paid))?;
            state.amount_calculated = checked(state.amount_calculated.checked_sub(received))?;
        } else {
            state.amount_remaining = checked(state.amount_remaining.checked_add(received))?;
            state.amount_calculated = checked(state.amount_calculated.checked_add(paid))?;
        }

        if state.liquidity > 0 {
            state.fee_growth_global_x128 = state
                .fee_growth_global_x128
                .wrapping_add(fee_growth_delta(env, step.fee_amount, state.liquidity));
        }

        if state.sqrt_price_x96 == sqrt_price_next_x96 {
            if initialized {
                let (fee_growth_0, fee_growth_1) = if zero_for_one {
                    (state.fee_growth_global_x128, pool.fee_growth_global_1_x128)
                } else {
                    (pool.fee_growth_global_0_x128, state.fee_growth_global_x128)
                };
                let liquidity_net = ledger.cross(tick_next, fee_growth_0, fee_growth_1)?;
                // Moving left enters the range below, so the net flips sign
                let liquidity_delta = if zero_for_one {
                    checked(liquidity_net.checked_neg())?
                } else {
                    liquidity_net
                };
                state.liquidity = checked(checked_add_delta(state.liquidity, liquidity_delta))?;
                ticks_crossed += 1;
            }
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x96 != step_start_x96 {
            state.tick = get_tick_at_sqrt_ratio(env, state.sqrt_price_x96);
        }
    }

    let settled = checked(params.amount_specified.checked_sub(state.amount_remaining))?;
    let (amount0, amount1) = if zero_for_one == exact_input {
        (settled, state.amount_calculated)
    } else {
        (state.amount_calculated, settled)
    };

    Ok(SwapComputation {
        amount0,
        amount1,
        sqrt_price_x96: state.sqrt_price_x96,
        tick: state.tick,
        liquidity: state.liquidity,
        fee_growth_global_x128: state.fee_growth_global_x128,
        fee_growth_is_token0: zero_for_one,
        ticks_crossed,
        steps,
    })
}

/// fee * 2^128 / liquidity, kept modulo 2^128 like the accumulator it feeds
pub fn fee_growth_delta(env: &Env, fee_amount: u128, liquidity: u128) -> u128 {
    let growth = U256::from_u128(env, fee_amount)
        .shl(128)
        .div(&U256::from_u128(env, liquidity));
    to_u128(&growth.rem_euclid(&q128(env)))
}

fn to_amount(value: u128) -> Result<i128, SwapError> {
    i128::try_from(value).map_err(|_| SwapError::AmountOverflow)
}

fn checked<T>(value: Option<T>) -> Result<T, SwapError> {
    value.ok_or(SwapError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqrt_price_math::get_amount0_delta;
    use crate::tick_bitmap::{compress, position};
    use soroban_sdk::{Env, Map, Vec};

    const LIQUIDITY: u128 = 1_000_000_000_000_000_000;
    const SPACING: i32 = 60;

    struct MemoryLedger {
        words: Map<i32, u128>,
        nets: Map<i32, i128>,
        crossed: Vec<i32>,
        available: bool,
    }

    impl MemoryLedger {
        /// One position of LIQUIDITY over [lower, upper]
        fn with_position(env: &Env, lower: i32, upper: i32) -> Self {
            let mut ledger = MemoryLedger {
                words: Map::new(env),
                nets: Map::new(env),
                crossed: Vec::new(env),
                available: true,
            };
            for (tick, net) in [(lower, LIQUIDITY as i128), (upper, -(LIQUIDITY as i128))] {
                let (word_pos, bit_pos) = position(compress(tick, SPACING));
                let word = ledger.words.get(word_pos).unwrap_or(0);
                ledger.words.set(word_pos, word | (1 << bit_pos));
                ledger.nets.set(tick, net);
            }
            ledger
        }
    }

    impl TickLedger for MemoryLedger {
        fn bitmap_word(&self, word_pos: i32) -> Result<u128, SwapError> {
            if !self.available {
                return Err(SwapError::LedgerUnavailable);
            }
            Ok(self.words.get(word_pos).unwrap_or(0))
        }

        fn cross(&mut self, tick: i32, _: u128, _: u128) -> Result<i128, SwapError> {
            self.crossed.push_back(tick);
            Ok(self.nets.get(tick).unwrap_or(0))
        }
    }

    fn pool_at_tick(env: &Env, tick: i32) -> PoolState {
        let mut pool = PoolState::new(get_sqrt_ratio_at_tick(env, tick), tick);
        pool.liquidity = LIQUIDITY;
        pool
    }

    fn params(zero_for_one: bool, amount_specified: i128, limit: u128) -> SwapParams {
        SwapParams {
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96: resolve_price_limit(zero_for_one, limit),
            max_crossings: u32::MAX,
            max_steps: u32::MAX,
        }
    }

    #[test]
    fn test_resolve_price_limit() {
        assert_eq!(resolve_price_limit(true, 0), MIN_SQRT_RATIO + 1);
        assert_eq!(resolve_price_limit(false, 0), MAX_SQRT_RATIO - 1);
        assert_eq!(resolve_price_limit(true, 12345), 12345);
    }

    #[test]
    fn test_rejects_zero_amount() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let pool = pool_at_tick(&env, 30);

        let result = compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &params(true, 0, 0));
        assert_eq!(result, Err(SwapError::ZeroAmount));
    }

    #[test]
    fn test_rejects_limit_on_wrong_side() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let pool = pool_at_tick(&env, 30);
        let above = get_sqrt_ratio_at_tick(&env, 90);

        let result = compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &params(true, 1000, above));
        assert_eq!(result, Err(SwapError::InvalidPriceLimit));

        let mut at_bound = params(true, 1000, 0);
        at_bound.sqrt_price_limit_x96 = MIN_SQRT_RATIO;
        let result = compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &at_bound);
        assert_eq!(result, Err(SwapError::InvalidPriceLimit));
    }

    #[test]
    fn test_single_step_matches_swap_step() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let pool = pool_at_tick(&env, 30);

        let result =
            compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &params(true, 1_000_000, 0))
                .unwrap();
        let step = compute_swap_step(
            &env,
            pool.sqrt_price_x96,
            get_sqrt_ratio_at_tick(&env, 0),
            LIQUIDITY,
            1_000_000,
            3000,
        );

        assert_eq!(result.steps, 1);
        assert_eq!(result.amount0, 1_000_000);
        assert_eq!(result.amount1, -(step.amount_out as i128));
        assert_eq!(result.sqrt_price_x96, step.sqrt_price_next_x96);
        assert_eq!(result.tick, 29);
        assert_eq!(result.ticks_crossed, 0);
        assert!(result.fee_growth_is_token0);
        assert!(result.fee_growth_global_x128 > 0);
    }

    #[test]
    fn test_exact_output_settles_requested_amount() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let pool = pool_at_tick(&env, 30);

        let result =
            compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &params(false, -1_000_000, 0))
                .unwrap();

        // Buying token0 with token1
        assert_eq!(result.amount0, -1_000_000);
        assert!(result.amount1 > 1_000_000);
        assert!(result.sqrt_price_x96 > pool.sqrt_price_x96);
        assert!(!result.fee_growth_is_token0);
    }

    #[test]
    fn test_crosses_initialized_tick() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let pool = pool_at_tick(&env, 30);
        let limit = get_sqrt_ratio_at_tick(&env, -1200);

        let result = compute_swap(
            &env,
            &mut ledger,
            &pool,
            SPACING,
            3000,
            &params(true, LIQUIDITY as i128, limit),
        )
        .unwrap();

        // Tick 0 (word boundary), tick -600 (crossed), then the limit
        assert_eq!(result.steps, 3);
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(ledger.crossed, Vec::from_array(&env, [-600]));
        assert_eq!(result.liquidity, 0);
        assert_eq!(result.sqrt_price_x96, limit);
        assert_eq!(result.tick, -1200);

        // Only the range down to -600 had liquidity; the rest is a partial fill
        let lower = get_sqrt_ratio_at_tick(&env, -600);
        let needed = get_amount0_delta(&env, lower, pool.sqrt_price_x96, LIQUIDITY, true);
        assert!(result.amount0 > needed as i128);
        assert!(result.amount0 < LIQUIDITY as i128);
        assert!(result.amount1 < 0);
    }

    #[test]
    fn test_stops_at_crossing_cap() {
        let env = Env::default();
        let limit = get_sqrt_ratio_at_tick(&env, -1200);
        let pool = pool_at_tick(&env, 30);

        let mut uncapped_ledger = MemoryLedger::with_position(&env, -600, 600);
        let uncapped = compute_swap(
            &env,
            &mut uncapped_ledger,
            &pool,
            SPACING,
            3000,
            &params(true, LIQUIDITY as i128, limit),
        )
        .unwrap();

        let mut capped_params = params(true, LIQUIDITY as i128, limit);
        capped_params.max_crossings = 1;
        let mut capped_ledger = MemoryLedger::with_position(&env, -600, 600);
        let capped =
            compute_swap(&env, &mut capped_ledger, &pool, SPACING, 3000, &capped_params).unwrap();

        assert_eq!(capped.steps, 2);
        assert_eq!(capped.ticks_crossed, 1);
        assert_eq!(capped.sqrt_price_x96, get_sqrt_ratio_at_tick(&env, -600));
        assert_eq!(capped.tick, -601);
        // Nothing trades past -600, so the amounts agree
        assert_eq!(capped.amount0, uncapped.amount0);
        assert_eq!(capped.amount1, uncapped.amount1);
    }

    #[test]
    fn test_step_budget() {
        let env = Env::default();
        let limit = get_sqrt_ratio_at_tick(&env, -1200);
        let pool = pool_at_tick(&env, 30);

        let mut tight = params(true, LIQUIDITY as i128, limit);
        tight.max_steps = 2;
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        let result = compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &tight);
        assert_eq!(result, Err(SwapError::StepBudgetExceeded));

        let mut enough = params(true, LIQUIDITY as i128, limit);
        enough.max_steps = 3;
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        assert!(compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &enough).is_ok());
    }

    #[test]
    fn test_ledger_failure_propagates() {
        let env = Env::default();
        let mut ledger = MemoryLedger::with_position(&env, -600, 600);
        ledger.available = false;
        let pool = pool_at_tick(&env, 30);

        let result = compute_swap(&env, &mut ledger, &pool, SPACING, 3000, &params(true, 1000, 0));
        assert_eq!(result, Err(SwapError::LedgerUnavailable));
    }

    #[test]
    fn test_fee_growth_delta_wraps() {
        let env = Env::default();
        assert_eq!(fee_growth_delta(&env, 1, 2), 1u128 << 127);
        // 2^128 / 1 wraps to zero
        assert_eq!(fee_growth_delta(&env, 1, 1), 0);
        assert_eq!(fee_growth_delta(&env, 0, 1), 0);
    }
}
