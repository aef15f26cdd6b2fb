use crate::storage::{get_config, get_state, set_state};
use crate::tick::PoolLedger;
use dex_math::{compute_swap, resolve_price_limit, SwapError};
use dex_types::{SwapComputation, SwapParams, MAX_TICK_CROSSINGS_PER_SWAP};
use soroban_sdk::{token, Address, Env, Symbol};

/// Execute a swap.
///
/// At most MAX_TICK_CROSSINGS_PER_SWAP initialized ticks are crossed; a
/// larger swap is partially filled and the rest can be sent in a later
/// transaction.
pub fn execute_swap(
    env: &Env,
    recipient: Address,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
) -> (i128, i128) {
    let config = get_config(env);
    let mut state = get_state(env);

    let mut ledger = PoolLedger::committing(env);
    let result = run(
        env,
        &mut ledger,
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x96,
    );

    state.sqrt_price_x96 = result.sqrt_price_x96;
    state.tick = result.tick;
    state.liquidity = result.liquidity;
    if result.fee_growth_is_token0 {
        state.fee_growth_global_0_x128 = result.fee_growth_global_x128;
    } else {
        state.fee_growth_global_1_x128 = result.fee_growth_global_x128;
    }
    set_state(env, &state);

    let (amount0, amount1) = (result.amount0, result.amount1);
    let token0_client = token::Client::new(env, &config.token0);
    let token1_client = token::Client::new(env, &config.token1);
    let contract_address = env.current_contract_address();

    if amount0 > 0 {
        token0_client.transfer(&recipient, &contract_address, &amount0);
    } else if amount0 < 0 {
        token0_client.transfer(&contract_address, &recipient, &(-amount0));
    }
    if amount1 > 0 {
        token1_client.transfer(&recipient, &contract_address, &amount1);
    } else if amount1 < 0 {
        token1_client.transfer(&contract_address, &recipient, &(-amount1));
    }

    env.events().publish(
        (Symbol::new(env, "swap"), recipient),
        (amount0, amount1, state.sqrt_price_x96, state.liquidity, state.tick),
    );

    (amount0, amount1)
}

/// Price a swap against current storage without persisting anything
pub fn quote_swap(
    env: &Env,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
) -> (i128, i128) {
    let mut ledger = PoolLedger::read_only(env);
    let result = run(
        env,
        &mut ledger,
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x96,
    );
    (result.amount0, result.amount1)
}

fn run(
    env: &Env,
    ledger: &mut PoolLedger,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
) -> SwapComputation {
    let config = get_config(env);
    let state = get_state(env);

    let params = SwapParams {
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x96: resolve_price_limit(zero_for_one, sqrt_price_limit_x96),
        max_crossings: MAX_TICK_CROSSINGS_PER_SWAP,
        max_steps: u32::MAX,
    };

    match compute_swap(env, ledger, &state, config.tick_spacing, config.fee, &params) {
        Ok(result) => result,
        Err(SwapError::ZeroAmount) => panic!("Amount must be non-zero"),
        Err(SwapError::InvalidPriceLimit) => panic!("Invalid price limit"),
        Err(SwapError::AmountOverflow) => panic!("Swap amount overflow"),
        Err(SwapError::StepBudgetExceeded) | Err(SwapError::LedgerUnavailable) => {
            panic!("Swap could not complete")
        }
    }
}
