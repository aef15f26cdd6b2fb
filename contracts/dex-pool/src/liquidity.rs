use crate::storage::{get_config, get_position, get_state, set_position, set_state};
use crate::tick::{flip_tick, update as update_tick};
use dex_math::{add_delta, get_amounts_for_liquidity, get_sqrt_ratio_at_tick};
use dex_types::{PositionKey, MAX_TICK, MIN_TICK};
use soroban_sdk::{token, Address, Env};

/// Add liquidity to a position, pulling the backing tokens from `recipient`
pub fn mint(
    env: &Env,
    recipient: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> (u128, u128) {
    if amount == 0 {
        panic!("Amount must be non-zero");
    }

    let config = get_config(env);
    let mut state = get_state(env);

    validate_ticks(tick_lower, tick_upper, config.tick_spacing);
    let liquidity_delta =
        i128::try_from(amount).unwrap_or_else(|_| panic!("Liquidity overflow"));

    let (amount0, amount1) = get_amounts_for_liquidity(
        env,
        state.sqrt_price_x96,
        get_sqrt_ratio_at_tick(env, tick_lower),
        get_sqrt_ratio_at_tick(env, tick_upper),
        amount,
        true,
    );

    for (tick, upper) in [(tick_lower, false), (tick_upper, true)] {
        let flipped = update_tick(
            env,
            tick,
            state.tick,
            liquidity_delta,
            state.fee_growth_global_0_x128,
            state.fee_growth_global_1_x128,
            upper,
            config.max_liquidity_per_tick,
        );
        if flipped {
            flip_tick(env, tick, config.tick_spacing);
        }
    }

    let key = PositionKey {
        owner: recipient.clone(),
        tick_lower,
        tick_upper,
    };
    let mut position = get_position(env, &key);
    position.liquidity = add_delta(position.liquidity, liquidity_delta);
    set_position(env, &key, &position);

    if state.tick >= tick_lower && state.tick < tick_upper {
        state.liquidity = add_delta(state.liquidity, liquidity_delta);
        set_state(env, &state);
    }

    let contract_address = env.current_contract_address();
    if amount0 > 0 {
        token::Client::new(env, &config.token0).transfer(
            &recipient,
            &contract_address,
            &to_amount(amount0),
        );
    }
    if amount1 > 0 {
        token::Client::new(env, &config.token1).transfer(
            &recipient,
            &contract_address,
            &to_amount(amount1),
        );
    }

    (amount0, amount1)
}

fn to_amount(amount: u128) -> i128 {
    i128::try_from(amount).unwrap_or_else(|_| panic!("Token amount overflow"))
}

fn validate_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) {
    if tick_lower >= tick_upper {
        panic!("tick_lower must be less than tick_upper");
    }
    if tick_lower < MIN_TICK {
        panic!("tick_lower too low");
    }
    if tick_upper > MAX_TICK {
        panic!("tick_upper too high");
    }
    if tick_lower % tick_spacing != 0 || tick_upper % tick_spacing != 0 {
        panic!("Ticks not on spacing");
    }
}
