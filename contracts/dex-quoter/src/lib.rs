#![no_std]

//! Quotes swaps through one or more pools without executing them.
//!
//! Every quote replays the pool's own swap loop against a read-only snapshot
//! of the pool, so a quote is exactly what `swap` would settle against the
//! same ledger state.

mod error;
mod path;
mod quote;
mod route;
mod simulate;
mod storage;
mod types;

pub use error::QuoterError;
pub use types::*;

use soroban_sdk::{contract, contractimpl, vec, Address, Bytes, Env, Vec};

#[contract]
pub struct DexQuoter;

#[contractimpl]
impl DexQuoter {
    /// Point the quoter at a pool registry.
    ///
    /// `max_steps` bounds the swap loop iterations of each hop; quotes that
    /// need more fail with `OutOfResources`.
    pub fn initialize(env: Env, factory: Address, max_steps: u32) -> Result<(), QuoterError> {
        if storage::is_initialized(&env) {
            return Err(QuoterError::AlreadyInitialized);
        }
        storage::set_config(&env, &QuoterConfig { factory, max_steps });
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<QuoterConfig, QuoterError> {
        storage::get_config(&env)
    }

    /// Output of swapping exactly `amount_in` of `token_in` in one pool
    pub fn quote_exact_input_single(
        env: Env,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: i128,
        sqrt_price_limit_x96: u128,
    ) -> Result<QuoteResult, QuoterError> {
        let config = storage::get_config(&env)?;
        let hop = Hop {
            token_in,
            fee,
            token_out,
        };
        let diagnostics = quote::quote_hop(&env, &config, &hop, true, amount_in, sqrt_price_limit_x96)?;
        Ok(single_hop_result(&env, diagnostics))
    }

    /// Input needed to receive exactly `amount_out` of `token_out` from one pool
    pub fn quote_exact_output_single(
        env: Env,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_out: i128,
        sqrt_price_limit_x96: u128,
    ) -> Result<QuoteResult, QuoterError> {
        let config = storage::get_config(&env)?;
        let hop = Hop {
            token_in,
            fee,
            token_out,
        };
        let diagnostics =
            quote::quote_hop(&env, &config, &hop, false, amount_out, sqrt_price_limit_x96)?;
        Ok(single_hop_result(&env, diagnostics))
    }

    /// Output of swapping exactly `amount_in` along an encoded path
    pub fn quote_exact_input(env: Env, path: Bytes, amount_in: i128) -> Result<QuoteResult, QuoterError> {
        let config = storage::get_config(&env)?;
        route::quote_exact_input(&env, &config, &path, amount_in)
    }

    /// Input needed to receive exactly `amount_out` at the end of an encoded
    /// path. The path is written in swap direction, first token in.
    pub fn quote_exact_output(env: Env, path: Bytes, amount_out: i128) -> Result<QuoteResult, QuoterError> {
        let config = storage::get_config(&env)?;
        route::quote_exact_output(&env, &config, &path, amount_out)
    }

    pub fn encode_path(env: Env, tokens: Vec<Address>, fees: Vec<u32>) -> Result<Bytes, QuoterError> {
        path::encode_path(&env, &tokens, &fees)
    }

    pub fn decode_path(env: Env, path: Bytes) -> Result<Vec<Hop>, QuoterError> {
        path::decode_path(&env, &path)
    }
}

fn single_hop_result(env: &Env, diagnostics: HopDiagnostics) -> QuoteResult {
    QuoteResult {
        amount_in: diagnostics.amount_in,
        amount_out: diagnostics.amount_out,
        hops: vec![env, diagnostics],
    }
}
