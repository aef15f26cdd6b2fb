use soroban_sdk::contracttype;

/// Per-tick record kept by a pool for every tick some position references.
///
/// The `fee_growth_outside` values are relative: they hold growth on the side
/// of the tick opposite the current price and are flipped on every crossing.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TickInfo {
    pub liquidity_gross: u128,
    /// Added to active liquidity when the price moves up through the tick
    pub liquidity_net: i128,
    pub fee_growth_outside_0_x128: u128,
    pub fee_growth_outside_1_x128: u128,
    pub initialized: bool,
}
