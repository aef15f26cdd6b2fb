use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use soroban_sdk::Env;

/// Token amounts backing `liquidity` between two prices at the current price.
///
/// Below the range the position is all token0, above it all token1. Amounts
/// are rounded up when `round_up` is set, which is what the pool charges on
/// mint.
pub fn get_amounts_for_liquidity(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> (u128, u128) {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        let amount0 =
            get_amount0_delta(env, sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up);
        (amount0, 0)
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        let amount0 = get_amount0_delta(env, sqrt_ratio_x96, sqrt_ratio_upper, liquidity, round_up);
        let amount1 = get_amount1_delta(env, sqrt_ratio_lower, sqrt_ratio_x96, liquidity, round_up);
        (amount0, amount1)
    } else {
        let amount1 =
            get_amount1_delta(env, sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up);
        (0, amount1)
    }
}

/// Apply a signed liquidity delta, `None` on underflow or overflow
pub fn checked_add_delta(liquidity: u128, delta: i128) -> Option<u128> {
    if delta < 0 {
        liquidity.checked_sub(delta.unsigned_abs())
    } else {
        liquidity.checked_add(delta as u128)
    }
}

/// Apply a signed liquidity delta
pub fn add_delta(liquidity: u128, delta: i128) -> u128 {
    checked_add_delta(liquidity, delta).unwrap_or_else(|| {
        if delta < 0 {
            panic!("Liquidity underflow")
        } else {
            panic!("Liquidity overflow")
        }
    })
}
