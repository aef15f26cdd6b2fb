use soroban_sdk::{Env, U256};

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns (a * b) / denominator
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    let result = checked_mul_div(
        env,
        &U256::from_u128(env, a),
        &U256::from_u128(env, b),
        &U256::from_u128(env, denominator),
        false,
    );
    // The product of two u128 values always fits in 256 bits
    to_u128(&result.unwrap_or_else(|| panic!("mul_div overflow")))
}

/// Multiply and divide with 256-bit intermediate precision (rounds up)
/// Returns ceil((a * b) / denominator)
pub fn mul_div_rounding_up(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    let result = checked_mul_div(
        env,
        &U256::from_u128(env, a),
        &U256::from_u128(env, b),
        &U256::from_u128(env, denominator),
        true,
    );
    to_u128(&result.unwrap_or_else(|| panic!("mul_div overflow")))
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> u128 {
    if b == 0 {
        panic!("Division by zero");
    }
    if a == 0 {
        return 0;
    }
    (a - 1) / b + 1
}

/// Computes `a * b / denominator` over 256-bit operands.
///
/// Returns `None` when neither the product nor the split
/// `q * b + (r * b) / denominator` (with `a = q * denominator + r`) fits in
/// 256 bits. Whenever a value is returned it is exact, rounded in the
/// requested direction.
pub fn checked_mul_div(
    env: &Env,
    a: &U256,
    b: &U256,
    denominator: &U256,
    round_up: bool,
) -> Option<U256> {
    let zero = U256::from_u32(env, 0);
    if *denominator == zero {
        panic!("Division by zero");
    }
    if *a == zero || *b == zero {
        return Some(zero);
    }

    if product_fits(env, a, b) {
        return Some(div_round(env, &a.mul(b), denominator, round_up));
    }

    split_mul_div(env, a, b, denominator, round_up)
        .or_else(|| split_mul_div(env, b, a, denominator, round_up))
}

/// 256-bit division with rounding up
pub fn u256_div_rounding_up(env: &Env, a: &U256, b: &U256) -> U256 {
    div_round(env, a, b, true)
}

/// Convert U256 to u128, panics if overflow
pub fn to_u128(value: &U256) -> u128 {
    value
        .to_u128()
        .unwrap_or_else(|| panic!("U256 overflow when converting to u128"))
}

/// 2^128 as U256
pub fn q128(env: &Env) -> U256 {
    U256::from_parts(env, 0, 1, 0, 0)
}

/// 2^256 - 1
pub fn u256_max(env: &Env) -> U256 {
    U256::from_parts(env, u64::MAX, u64::MAX, u64::MAX, u64::MAX)
}

fn product_fits(env: &Env, a: &U256, b: &U256) -> bool {
    *a <= u256_max(env).div(b)
}

fn div_round(env: &Env, numerator: &U256, denominator: &U256, round_up: bool) -> U256 {
    let quotient = numerator.div(denominator);
    if round_up && numerator.rem_euclid(denominator) != U256::from_u32(env, 0) {
        quotient.add(&U256::from_u32(env, 1))
    } else {
        quotient
    }
}

// a * b / d = q * b + (r * b) / d, exact because q * b is an integer
fn split_mul_div(
    env: &Env,
    a: &U256,
    b: &U256,
    denominator: &U256,
    round_up: bool,
) -> Option<U256> {
    let quotient = a.div(denominator);
    let remainder = a.rem_euclid(denominator);
    if !product_fits(env, &quotient, b) || !product_fits(env, &remainder, b) {
        return None;
    }

    let whole = quotient.mul(b);
    let fraction = div_round(env, &remainder.mul(b), denominator, round_up);
    if whole > u256_max(env).sub(&fraction) {
        return None;
    }
    Some(whole.add(&fraction))
}
