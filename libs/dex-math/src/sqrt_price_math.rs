use crate::full_math::{
    checked_mul_div, mul_div, mul_div_rounding_up, to_u128, u256_div_rounding_up,
};
use dex_types::Q96;
use soroban_sdk::{Env, U256};

/// Calculate amount0 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_x = L * (sqrt_pb - sqrt_pa) / (sqrt_pa * sqrt_pb)
pub fn get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    checked_amount0_delta(env, sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, round_up)
        .unwrap_or_else(|| panic!("amount0 overflow"))
}

/// Calculate amount1 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_y = L * (sqrt_pb - sqrt_pa)
pub fn get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    checked_amount1_delta(env, sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, round_up)
        .unwrap_or_else(|| panic!("amount1 overflow"))
}

/// `get_amount0_delta`, or `None` when the amount does not fit in a u128
pub fn checked_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Option<u128> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_lower == 0 {
        panic!("sqrt_ratio_lower cannot be zero");
    }

    let numerator1 = liquidity_x96(env, liquidity);
    let numerator2 = U256::from_u128(env, sqrt_ratio_upper - sqrt_ratio_lower);
    let upper = U256::from_u128(env, sqrt_ratio_upper);
    let lower = U256::from_u128(env, sqrt_ratio_lower);

    // numerator2 and upper are both below 2^128, so the split never fails
    let scaled = checked_mul_div(env, &numerator1, &numerator2, &upper, round_up)?;

    if round_up {
        u256_div_rounding_up(env, &scaled, &lower).to_u128()
    } else {
        scaled.div(&lower).to_u128()
    }
}

/// `get_amount1_delta`, or `None` when the amount does not fit in a u128
pub fn checked_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Option<u128> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    checked_mul_div(
        env,
        &U256::from_u128(env, liquidity),
        &U256::from_u128(env, sqrt_ratio_upper - sqrt_ratio_lower),
        &U256::from_u128(env, Q96),
        round_up,
    )?
    .to_u128()
}

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Get next sqrt price from an input amount of token0 or token1
pub fn get_next_sqrt_price_from_input(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> u128 {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        panic!("Invalid inputs");
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Get next sqrt price from an output amount
pub fn get_next_sqrt_price_from_output(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> u128 {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        panic!("Invalid inputs");
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_out, false)
    }
}

/// Calculate next sqrt price given a token0 amount
/// sqrt_price_next = sqrt_price * L / (L + amount * sqrt_price)  [if add]
/// sqrt_price_next = sqrt_price * L / (L - amount * sqrt_price)  [if remove]
fn get_next_sqrt_price_from_amount0_rounding_up(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> u128 {
    if amount == 0 {
        return sqrt_price_x96;
    }

    let numerator1 = liquidity_x96(env, liquidity);
    let sqrt_price = U256::from_u128(env, sqrt_price_x96);
    // Both factors are below 2^128
    let product = U256::from_u128(env, amount).mul(&sqrt_price);

    if add {
        let denominator = numerator1.add(&product);
        let next = checked_mul_div(env, &numerator1, &sqrt_price, &denominator, true)
            .unwrap_or_else(|| {
                // numerator1 / (numerator1 / sqrt_price + amount), still rounded up
                let fallback = numerator1
                    .div(&sqrt_price)
                    .add(&U256::from_u128(env, amount));
                u256_div_rounding_up(env, &numerator1, &fallback)
            });
        to_u128(&next)
    } else {
        if numerator1 <= product {
            panic!("Denominator underflow");
        }
        let denominator = numerator1.sub(&product);
        let next = checked_mul_div(env, &numerator1, &sqrt_price, &denominator, true)
            .unwrap_or_else(|| panic!("sqrt_price overflow"));
        to_u128(&next)
    }
}

/// Calculate next sqrt price given a token1 amount
/// sqrt_price_next = sqrt_price + amount / L  [if add]
/// sqrt_price_next = sqrt_price - amount / L  [if remove]
fn get_next_sqrt_price_from_amount1_rounding_down(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> u128 {
    if add {
        let quotient = mul_div(env, amount, Q96, liquidity);
        sqrt_price_x96
            .checked_add(quotient)
            .unwrap_or_else(|| panic!("sqrt_price overflow"))
    } else {
        let quotient = mul_div_rounding_up(env, amount, Q96, liquidity);
        if sqrt_price_x96 <= quotient {
            panic!("sqrt_price underflow");
        }
        sqrt_price_x96 - quotient
    }
}

/// L << 96 as U256
fn liquidity_x96(env: &Env, liquidity: u128) -> U256 {
    U256::from_u128(env, liquidity).shl(96)
}
