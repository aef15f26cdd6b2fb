use crate::full_math::{mul_div, mul_div_rounding_up};
use crate::sqrt_price_math::{
    checked_amount0_delta, checked_amount1_delta, get_amount0_delta, get_amount1_delta,
    get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use dex_types::Fee;
use soroban_sdk::Env;

/// Fee denominator: fees are expressed in hundredths of a basis point
pub const FEE_DENOMINATOR: u128 = 1_000_000;

/// Outcome of swapping within a single price range
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapStep {
    /// Sqrt price reached by this step
    pub sqrt_price_next_x96: u128,
    /// Input consumed, excluding the fee
    pub amount_in: u128,
    /// Output produced
    pub amount_out: u128,
    /// Fee charged on the input
    pub fee_amount: u128,
}

/// Swap within one range of constant liquidity, moving from
/// `sqrt_price_current_x96` toward `sqrt_price_target_x96`.
///
/// `amount_remaining` is positive for exact input and negative for exact
/// output. The direction is implied by the target: a target at or below the
/// current price sells token0.
pub fn compute_swap_step(
    env: &Env,
    sqrt_price_current_x96: u128,
    sqrt_price_target_x96: u128,
    liquidity: u128,
    amount_remaining: i128,
    fee: Fee,
) -> SwapStep {
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let exact_input = amount_remaining >= 0;
    let remaining = amount_remaining.unsigned_abs();
    let fee = fee as u128;

    // Amount needed to reach the target, on the specified side. Saturates at
    // u128::MAX, which no remaining amount can cover.
    let to_target = if exact_input {
        input_to_target(env, sqrt_price_current_x96, sqrt_price_target_x96, liquidity, zero_for_one)
    } else {
        output_to_target(env, sqrt_price_current_x96, sqrt_price_target_x96, liquidity, zero_for_one)
    };

    let sqrt_price_next_x96 = if exact_input {
        let remaining_less_fee = mul_div(env, remaining, FEE_DENOMINATOR - fee, FEE_DENOMINATOR);
        if remaining_less_fee >= to_target {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_input(
                env,
                sqrt_price_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )
        }
    } else if remaining >= to_target {
        sqrt_price_target_x96
    } else {
        get_next_sqrt_price_from_output(
            env,
            sqrt_price_current_x96,
            liquidity,
            remaining,
            zero_for_one,
        )
    };

    let reached_target = sqrt_price_next_x96 == sqrt_price_target_x96;

    let amount_in = if reached_target && exact_input {
        to_target
    } else {
        input_between(env, sqrt_price_current_x96, sqrt_price_next_x96, liquidity, zero_for_one)
    };
    let mut amount_out = if reached_target && !exact_input {
        to_target
    } else {
        output_between(env, sqrt_price_current_x96, sqrt_price_next_x96, liquidity, zero_for_one)
    };

    if !exact_input && amount_out > remaining {
        amount_out = remaining;
    }

    // A step that stops short of its target consumed the whole input
    let fee_amount = if exact_input && !reached_target {
        remaining - amount_in
    } else {
        mul_div_rounding_up(env, amount_in, fee, FEE_DENOMINATOR - fee)
    };

    SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    }
}

fn input_to_target(env: &Env, from: u128, to: u128, liquidity: u128, zero_for_one: bool) -> u128 {
    if zero_for_one {
        checked_amount0_delta(env, to, from, liquidity, true)
    } else {
        checked_amount1_delta(env, from, to, liquidity, true)
    }
    .unwrap_or(u128::MAX)
}

fn output_to_target(env: &Env, from: u128, to: u128, liquidity: u128, zero_for_one: bool) -> u128 {
    if zero_for_one {
        checked_amount1_delta(env, to, from, liquidity, false)
    } else {
        checked_amount0_delta(env, from, to, liquidity, false)
    }
    .unwrap_or(u128::MAX)
}

/// Input owed for a move between two prices, rounded up
fn input_between(env: &Env, from: u128, to: u128, liquidity: u128, zero_for_one: bool) -> u128 {
    if zero_for_one {
        get_amount0_delta(env, to, from, liquidity, true)
    } else {
        get_amount1_delta(env, from, to, liquidity, true)
    }
}

/// Output released for a move between two prices, rounded down
fn output_between(env: &Env, from: u128, to: u128, liquidity: u128, zero_for_one: bool) -> u128 {
    if zero_for_one {
        get_amount1_delta(env, to, from, liquidity, false)
    } else {
        get_amount0_delta(env, from, to, liquidity, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_types::Q96;
    use soroban_sdk::Env;

    const ONE: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_exact_input_capped_at_target() {
        let env = Env::default();
        let target = Q96 * 101 / 100;

        let step = compute_swap_step(&env, Q96, target, 2 * ONE, ONE as i128, 600);

        assert_eq!(step.sqrt_price_next_x96, target);
        assert_eq!(step.amount_in, 20_000_000_000_000_000);
        assert_eq!(step.amount_out, 19_801_980_198_019_801);
        assert_eq!(step.fee_amount, 12_007_204_322_594);
        // Input left over for the next range
        assert!(step.amount_in + step.fee_amount < ONE);
    }

    #[test]
    fn test_exact_output_capped_at_target() {
        let env = Env::default();
        let target = Q96 * 101 / 100;

        let step = compute_swap_step(&env, Q96, target, 2 * ONE, -(ONE as i128), 600);

        assert_eq!(step.sqrt_price_next_x96, target);
        assert_eq!(step.amount_in, 20_000_000_000_000_000);
        assert_eq!(step.amount_out, 19_801_980_198_019_801);
        assert_eq!(step.fee_amount, 12_007_204_322_594);
    }

    #[test]
    fn test_exact_input_fully_spent() {
        let env = Env::default();

        let step = compute_swap_step(&env, Q96, Q96 * 1000, 2 * ONE, ONE as i128, 600);

        assert_eq!(step.sqrt_price_next_x96, 118_818_475_322_642_227_089_037_862_318);
        assert_eq!(step.amount_in, 999_400_000_000_000_000);
        assert_eq!(step.amount_out, 666_399_946_655_997_866);
        assert_eq!(step.fee_amount, 600_000_000_000_000);
        assert_eq!(step.amount_in + step.fee_amount, ONE);
    }

    #[test]
    fn test_exact_input_zero_for_one() {
        let env = Env::default();
        let target = Q96 * 99 / 100;

        let step = compute_swap_step(&env, Q96, target, 2 * ONE, (ONE / 1000) as i128, 3000);

        assert!(step.sqrt_price_next_x96 < Q96);
        assert!(step.sqrt_price_next_x96 > target);
        assert_eq!(step.amount_in, 997_000_000_000_000);
        assert_eq!(step.amount_out, 996_503_243_133_298);
        assert_eq!(step.fee_amount, 3_000_000_000_000);
    }

    #[test]
    fn test_exact_output_zero_for_one() {
        let env = Env::default();
        let target = Q96 * 99 / 100;

        let step = compute_swap_step(&env, Q96, target, 2 * ONE, -((ONE / 1000) as i128), 3000);

        assert_eq!(step.sqrt_price_next_x96, 79_188_548_433_007_205_424_747_178_360);
        assert_eq!(step.amount_in, 1_000_500_250_125_063);
        assert_eq!(step.amount_out, ONE / 1000);
        assert_eq!(step.fee_amount, 3_010_532_347_418);
    }

    #[test]
    fn test_zero_amount_stays_put() {
        let env = Env::default();

        let step = compute_swap_step(&env, Q96, Q96 * 2, ONE, 0, 3000);

        assert_eq!(step.sqrt_price_next_x96, Q96);
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
        assert_eq!(step.fee_amount, 0);
    }

    #[test]
    fn test_zero_liquidity_jumps_to_target() {
        let env = Env::default();
        let target = Q96 * 2;

        let step = compute_swap_step(&env, Q96, target, 0, ONE as i128, 3000);

        assert_eq!(step.sqrt_price_next_x96, target);
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
    }

    #[test]
    fn test_exact_output_never_exceeds_request() {
        let env = Env::default();
        for requested in [1i128, 7, 1_000, 123_456_789] {
            let step = compute_swap_step(&env, Q96, Q96 / 2, ONE, -requested, 500);
            assert!(step.amount_out <= requested as u128);
        }
    }

    #[test]
    fn test_unreachable_target_does_not_overflow() {
        let env = Env::default();
        let current = crate::get_sqrt_ratio_at_tick(&env, 400_020);
        let target = crate::get_sqrt_ratio_at_tick(&env, 400_080);
        let liquidity = 1u128 << 110;
        // Reaching the target would take more token1 than a u128 holds
        assert_eq!(checked_amount1_delta(&env, current, target, liquidity, true), None);

        let step = compute_swap_step(&env, current, target, liquidity, 1, 3000);
        assert_eq!(step.sqrt_price_next_x96, current);
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
        assert_eq!(step.fee_amount, 1);

        let step = compute_swap_step(&env, current, target, liquidity, ONE as i128, 3000);
        assert!(step.sqrt_price_next_x96 > current && step.sqrt_price_next_x96 < target);
        assert_eq!(step.amount_in + step.fee_amount, ONE);
    }
}
