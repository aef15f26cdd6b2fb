use crate::error::QuoterError;
use crate::path::{decode_first_pool, decode_last_pool};
use crate::quote::quote_hop;
use crate::types::{QuoteResult, QuoterConfig};
use soroban_sdk::{Bytes, Env, Vec};

/// Walk `path` front to back, feeding each hop's output into the next
pub fn quote_exact_input(
    env: &Env,
    config: &QuoterConfig,
    path: &Bytes,
    amount_in: i128,
) -> Result<QuoteResult, QuoterError> {
    if amount_in < 0 {
        return Err(QuoterError::InvalidAmount);
    }

    let mut hops = Vec::new(env);
    let mut amount = amount_in;
    let mut remaining = Some(path.clone());
    while let Some(current) = remaining {
        let (hop, rest) = decode_first_pool(&current)?;
        let diagnostics = quote_hop(env, config, &hop, true, amount, 0)?;
        amount = diagnostics.amount_out;
        hops.push_back(diagnostics);
        remaining = rest;
    }

    Ok(QuoteResult {
        amount_in: hops.first().map_or(amount_in, |hop| hop.amount_in),
        amount_out: amount,
        hops,
    })
}

/// Walk `path` back to front: the last hop must produce `amount_out`, and
/// each earlier hop must produce what the hop after it consumes
pub fn quote_exact_output(
    env: &Env,
    config: &QuoterConfig,
    path: &Bytes,
    amount_out: i128,
) -> Result<QuoteResult, QuoterError> {
    if amount_out < 0 {
        return Err(QuoterError::InvalidAmount);
    }

    let mut hops = Vec::new(env);
    let mut amount = amount_out;
    let mut remaining = Some(path.clone());
    while let Some(current) = remaining {
        let (hop, prefix) = decode_last_pool(&current)?;
        let diagnostics = quote_hop(env, config, &hop, false, amount, 0)?;
        amount = diagnostics.amount_in;
        hops.push_front(diagnostics);
        remaining = prefix;
    }

    Ok(QuoteResult {
        amount_in: amount,
        amount_out: hops.last().map_or(amount_out, |hop| hop.amount_out),
        hops,
    })
}
