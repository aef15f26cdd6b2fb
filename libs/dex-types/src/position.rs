use soroban_sdk::{contracttype, Address};

/// A position is identified by who owns it and the range it covers
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Liquidity held by one position
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionInfo {
    pub liquidity: u128,
}
