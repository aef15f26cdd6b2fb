use soroban_sdk::{contracttype, Address};

/// Mutable pool state, rewritten by every swap and in-range mint
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    /// sqrt(token1 / token0) in Q64.96
    pub sqrt_price_x96: u128,
    /// Greatest tick whose price is at or below `sqrt_price_x96`
    pub tick: i32,
    /// Liquidity of the positions whose range contains `tick`
    pub liquidity: u128,
    /// Accumulated fees per unit of liquidity in Q128.128, modulo 2^128
    pub fee_growth_global_0_x128: u128,
    pub fee_growth_global_1_x128: u128,
}

impl PoolState {
    pub fn new(sqrt_price_x96: u128, tick: i32) -> Self {
        Self {
            sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global_0_x128: 0,
            fee_growth_global_1_x128: 0,
        }
    }
}

/// Set once by `initialize`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Registry the pool was created for
    pub factory: Address,
    /// token0 < token1
    pub token0: Address,
    pub token1: Address,
    /// Fee in hundredths of a basis point
    pub fee: u32,
    pub tick_spacing: i32,
    pub max_liquidity_per_tick: u128,
}

// The swap loop in dex-math works on the types below and never touches
// storage. Pools commit its result, quoters throw it away.

/// Inputs of one run of the swap loop
#[derive(Clone, Debug)]
pub struct SwapParams {
    pub zero_for_one: bool,
    /// Exact input when positive, exact output when negative
    pub amount_specified: i128,
    /// Resolved limit, never the zero sentinel
    pub sqrt_price_limit_x96: u128,
    /// Initialized ticks the run may cross before it stops with a partial fill
    pub max_crossings: u32,
    /// Loop iterations the run may take before it fails
    pub max_steps: u32,
}

/// Working copy the loop advances step by step
#[derive(Clone, Debug)]
pub struct SwapState {
    /// Specified amount not yet swapped
    pub amount_remaining: i128,
    /// Running total of the unspecified side
    pub amount_calculated: i128,
    pub sqrt_price_x96: u128,
    pub tick: i32,
    pub liquidity: u128,
    /// Global fee growth of the input token
    pub fee_growth_global_x128: u128,
}

/// Outcome of one run of the swap loop
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapComputation {
    /// Signed from the pool's side: positive is paid in, negative is paid out
    pub amount0: i128,
    pub amount1: i128,
    pub sqrt_price_x96: u128,
    pub tick: i32,
    pub liquidity: u128,
    /// New global fee growth of the input token
    pub fee_growth_global_x128: u128,
    /// True when `fee_growth_global_x128` belongs to token0
    pub fee_growth_is_token0: bool,
    pub ticks_crossed: u32,
    pub steps: u32,
}
