use crate::error::QuoterError;
use dex_math::{compute_swap, SwapError, TickLedger};
use dex_types::{PoolConfig, PoolState, SwapComputation, SwapParams, TickInfo};
use soroban_sdk::{log, Address, Env, IntoVal, Symbol, TryFromVal, Val, Vec};

/// Read-only view of a pool, fetched through its view functions.
///
/// Crossing a tick reports its `liquidity_net` and nothing else; the swap
/// state built on top of a snapshot is dropped once the quote is taken, so
/// the pool's stored state is never touched.
pub struct PoolSnapshot<'a> {
    env: &'a Env,
    pool: &'a Address,
}

impl<'a> PoolSnapshot<'a> {
    pub fn new(env: &'a Env, pool: &'a Address) -> Self {
        PoolSnapshot { env, pool }
    }

    pub fn state(&self) -> Result<PoolState, QuoterError> {
        self.read("get_state", Vec::new(self.env))
            .map_err(|_| QuoterError::Execution)
    }

    pub fn config(&self) -> Result<PoolConfig, QuoterError> {
        self.read("get_config", Vec::new(self.env))
            .map_err(|_| QuoterError::Execution)
    }

    /// Run the pool's swap loop against this snapshot
    pub fn dry_run(
        &mut self,
        state: &PoolState,
        config: &PoolConfig,
        params: &SwapParams,
    ) -> Result<SwapComputation, QuoterError> {
        let env = self.env;
        let pool = self.pool.clone();
        compute_swap(env, self, state, config.tick_spacing, config.fee, params).map_err(|err| {
            log!(env, "dry run failed", pool, err as u32);
            match err {
                SwapError::StepBudgetExceeded => QuoterError::OutOfResources,
                _ => QuoterError::Execution,
            }
        })
    }

    fn read<T>(&self, func: &str, args: Vec<Val>) -> Result<T, SwapError>
    where
        T: TryFromVal<Env, Val>,
    {
        let func = Symbol::new(self.env, func);
        match self
            .env
            .try_invoke_contract::<T, soroban_sdk::Error>(self.pool, &func, args)
        {
            Ok(Ok(value)) => Ok(value),
            _ => {
                log!(self.env, "pool read failed", self.pool.clone(), func);
                Err(SwapError::LedgerUnavailable)
            }
        }
    }
}

impl TickLedger for PoolSnapshot<'_> {
    fn bitmap_word(&self, word_pos: i32) -> Result<u128, SwapError> {
        self.read("get_tick_bitmap_word", (word_pos,).into_val(self.env))
    }

    fn cross(
        &mut self,
        tick: i32,
        _fee_growth_global_0_x128: u128,
        _fee_growth_global_1_x128: u128,
    ) -> Result<i128, SwapError> {
        let info: TickInfo = self.read("get_tick", (tick,).into_val(self.env))?;
        Ok(info.liquidity_net)
    }
}
