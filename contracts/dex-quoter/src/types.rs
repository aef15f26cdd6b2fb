use soroban_sdk::{contracttype, Address, Vec};

/// One pool on a route, walked from `token_in` to `token_out`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hop {
    pub token_in: Address,
    pub fee: u32,
    pub token_out: Address,
}

/// What a single pool would do with its part of a quote
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HopDiagnostics {
    /// Amount of `token_in` the pool would take
    pub amount_in: i128,
    /// Amount of `token_out` the pool would pay
    pub amount_out: i128,
    /// Pool price once the hop is done
    pub sqrt_price_after_x96: u128,
    /// Pool tick once the hop is done
    pub tick_after: i32,
    /// Initialized ticks the hop crosses
    pub initialized_ticks_crossed: u32,
    /// Swap loop iterations the hop needs, the quoter's unit of work
    pub steps: u32,
}

/// Result of any quote.
///
/// For exact input `amount_out` is the solved amount and `amount_in` is what
/// the route actually consumes, which is smaller than requested on a partial
/// fill. Exact output is the mirror image. `hops` follow path order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuoteResult {
    pub amount_in: i128,
    pub amount_out: i128,
    pub hops: Vec<HopDiagnostics>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuoterConfig {
    /// Registry resolving (token_a, token_b, fee) to a pool
    pub factory: Address,
    /// Swap loop iterations allowed per hop
    pub max_steps: u32,
}
