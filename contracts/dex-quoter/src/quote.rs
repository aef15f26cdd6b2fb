use crate::error::QuoterError;
use crate::simulate::PoolSnapshot;
use crate::types::{Hop, HopDiagnostics, QuoterConfig};
use dex_math::resolve_price_limit;
use dex_types::{SwapParams, MAX_TICK_CROSSINGS_PER_SWAP};
use soroban_sdk::{log, Address, Env, IntoVal, Symbol};

/// Quote one hop.
///
/// `amount` is the exact input when `exact_input` is set and the exact output
/// otherwise. A zero `sqrt_price_limit_x96` means no limit.
pub fn quote_hop(
    env: &Env,
    config: &QuoterConfig,
    hop: &Hop,
    exact_input: bool,
    amount: i128,
    sqrt_price_limit_x96: u128,
) -> Result<HopDiagnostics, QuoterError> {
    if amount < 0 {
        return Err(QuoterError::InvalidAmount);
    }

    let pool = find_pool(env, &config.factory, hop)?;
    let mut snapshot = PoolSnapshot::new(env, &pool);
    let state = snapshot.state()?;

    if amount == 0 {
        return Ok(HopDiagnostics {
            amount_in: 0,
            amount_out: 0,
            sqrt_price_after_x96: state.sqrt_price_x96,
            tick_after: state.tick,
            initialized_ticks_crossed: 0,
            steps: 0,
        });
    }

    let pool_config = snapshot.config()?;
    let zero_for_one = hop.token_in < hop.token_out;
    let params = SwapParams {
        zero_for_one,
        amount_specified: if exact_input { amount } else { -amount },
        sqrt_price_limit_x96: resolve_price_limit(zero_for_one, sqrt_price_limit_x96),
        max_crossings: MAX_TICK_CROSSINGS_PER_SWAP,
        max_steps: config.max_steps,
    };
    let result = snapshot.dry_run(&state, &pool_config, &params)?;

    let (amount_in, amount_out) = if zero_for_one {
        (result.amount0, -result.amount1)
    } else {
        (result.amount1, -result.amount0)
    };

    Ok(HopDiagnostics {
        amount_in,
        amount_out,
        sqrt_price_after_x96: result.sqrt_price_x96,
        tick_after: result.tick,
        initialized_ticks_crossed: result.ticks_crossed,
        steps: result.steps,
    })
}

/// Pool the registry holds for the hop's pair and fee
fn find_pool(env: &Env, factory: &Address, hop: &Hop) -> Result<Address, QuoterError> {
    let lookup = env.try_invoke_contract::<Option<Address>, soroban_sdk::Error>(
        factory,
        &Symbol::new(env, "get_pool"),
        (hop.token_in.clone(), hop.token_out.clone(), hop.fee).into_val(env),
    );
    match lookup {
        Ok(Ok(Some(pool))) => Ok(pool),
        Ok(Ok(None)) => Err(QuoterError::PoolNotFound),
        _ => {
            log!(env, "registry lookup failed", factory.clone(), hop.fee);
            Err(QuoterError::Execution)
        }
    }
}
