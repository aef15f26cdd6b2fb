#![no_std]

mod liquidity;
mod storage;
mod swap;
mod tick;

use dex_types::{PoolConfig, PoolState, PositionInfo, PositionKey, TickInfo};
use soroban_sdk::{contract, contractimpl, Address, Env};
use storage::{get_config, get_position, get_state, get_tick, is_initialized, set_config, set_state};

#[contract]
pub struct DexPool;

#[contractimpl]
impl DexPool {
    /// Initialize a new pool
    pub fn initialize(
        env: Env,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
        sqrt_price_x96: u128,
    ) {
        if is_initialized(&env) {
            panic!("Already initialized");
        }
        if token0 >= token1 {
            panic!("token0 must be less than token1");
        }
        if tick_spacing <= 0 {
            panic!("Invalid tick spacing");
        }

        let tick = dex_math::get_tick_at_sqrt_ratio(&env, sqrt_price_x96);

        let config = PoolConfig {
            factory,
            token0,
            token1,
            fee,
            tick_spacing,
            max_liquidity_per_tick: dex_types::max_liquidity_per_tick(tick_spacing),
        };
        set_config(&env, &config);
        set_state(&env, &PoolState::new(sqrt_price_x96, tick));
    }

    /// Execute a swap
    ///
    /// # Arguments
    /// * `recipient` - Address that pays the input and receives the output
    /// * `zero_for_one` - True if swapping token0 for token1
    /// * `amount_specified` - Positive for exact input, negative for exact output
    /// * `sqrt_price_limit_x96` - Price limit for the swap, 0 for none
    ///
    /// # Returns
    /// (amount0, amount1) - Negative values are amounts paid out
    pub fn swap(
        env: Env,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: u128,
    ) -> (i128, i128) {
        recipient.require_auth();
        swap::execute_swap(&env, recipient, zero_for_one, amount_specified, sqrt_price_limit_x96)
    }

    /// Amounts `swap` would settle right now, without changing any state
    pub fn quote_swap(
        env: Env,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: u128,
    ) -> (i128, i128) {
        swap::quote_swap(&env, zero_for_one, amount_specified, sqrt_price_limit_x96)
    }

    /// Add liquidity to a position
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts deposited
    pub fn mint(
        env: Env,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> (u128, u128) {
        recipient.require_auth();
        liquidity::mint(&env, recipient, tick_lower, tick_upper, amount)
    }

    // === View Functions ===

    pub fn get_state(env: Env) -> PoolState {
        get_state(&env)
    }

    pub fn get_config(env: Env) -> PoolConfig {
        get_config(&env)
    }

    pub fn get_tick(env: Env, tick: i32) -> TickInfo {
        get_tick(&env, tick)
    }

    /// Bitmap word of initialized ticks, 0 when none are set
    pub fn get_tick_bitmap_word(env: Env, word_pos: i32) -> u128 {
        storage::get_tick_bitmap_word(&env, word_pos)
    }

    pub fn get_position(
        env: Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> PositionInfo {
        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
        };
        get_position(&env, &key)
    }

    pub fn sqrt_price_x96(env: Env) -> u128 {
        get_state(&env).sqrt_price_x96
    }

    pub fn tick(env: Env) -> i32 {
        get_state(&env).tick
    }

    pub fn liquidity(env: Env) -> u128 {
        get_state(&env).liquidity
    }

    pub fn token0(env: Env) -> Address {
        get_config(&env).token0
    }

    pub fn token1(env: Env) -> Address {
        get_config(&env).token1
    }

    pub fn fee(env: Env) -> u32 {
        get_config(&env).fee
    }

    pub fn tick_spacing(env: Env) -> i32 {
        get_config(&env).tick_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_types::Q96;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::token::{StellarAssetClient, TokenClient};
    use soroban_sdk::{Address, Env};

    const ONE: u128 = 1_000_000_000_000_000_000;

    struct Setup<'a> {
        pool: DexPoolClient<'a>,
        token0: Address,
        token1: Address,
        user: Address,
    }

    fn sorted_pair(env: &Env) -> (Address, Address) {
        let admin = Address::generate(env);
        let a = env.register_stellar_asset_contract_v2(admin.clone()).address();
        let b = env.register_stellar_asset_contract_v2(admin).address();
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// 0.3% pool at price 1 with a funded user
    fn setup(env: &Env) -> Setup<'_> {
        env.mock_all_auths();
        let (token0, token1) = sorted_pair(env);

        let pool_id = env.register(DexPool, ());
        let pool = DexPoolClient::new(env, &pool_id);
        pool.initialize(&Address::generate(env), &token0, &token1, &3000u32, &60i32, &Q96);

        let user = Address::generate(env);
        let funding = 1_000_000 * ONE as i128;
        StellarAssetClient::new(env, &token0).mint(&user, &funding);
        StellarAssetClient::new(env, &token1).mint(&user, &funding);

        Setup {
            pool,
            token0,
            token1,
            user,
        }
    }

    fn balance(env: &Env, token: &Address, owner: &Address) -> i128 {
        TokenClient::new(env, token).balance(owner)
    }

    // === Initialization ===

    #[test]
    fn test_initialize_pool() {
        let env = Env::default();
        let factory = Address::generate(&env);
        let (t0, t1) = sorted_pair(&env);

        let client = DexPoolClient::new(&env, &env.register(DexPool, ()));
        client.initialize(&factory, &t0, &t1, &3000u32, &60i32, &Q96);

        let state = client.get_state();
        assert_eq!(state.sqrt_price_x96, Q96);
        assert_eq!(state.tick, 0);
        assert_eq!(state.liquidity, 0);

        let config = client.get_config();
        assert_eq!(config.factory, factory);
        assert_eq!(config.token0, t0);
        assert_eq!(config.token1, t1);
        assert_eq!(config.fee, 3000);
        assert_eq!(config.tick_spacing, 60);
        assert_eq!(config.max_liquidity_per_tick, dex_types::max_liquidity_per_tick(60));
    }

    #[test]
    #[should_panic(expected = "Already initialized")]
    fn test_initialize_twice_fails() {
        let env = Env::default();
        let s = setup(&env);
        s.pool
            .initialize(&Address::generate(&env), &s.token0, &s.token1, &3000u32, &60i32, &Q96);
    }

    #[test]
    #[should_panic(expected = "token0 must be less than token1")]
    fn test_initialize_wrong_token_order() {
        let env = Env::default();
        let (t0, t1) = sorted_pair(&env);
        let client = DexPoolClient::new(&env, &env.register(DexPool, ()));
        client.initialize(&Address::generate(&env), &t1, &t0, &3000u32, &60i32, &Q96);
    }

    #[test]
    fn test_view_functions() {
        let env = Env::default();
        let (t0, t1) = sorted_pair(&env);
        let client = DexPoolClient::new(&env, &env.register(DexPool, ()));

        // sqrt price 2 => price 4 => tick 13863
        client.initialize(&Address::generate(&env), &t0, &t1, &500u32, &10i32, &(Q96 * 2));

        assert_eq!(client.sqrt_price_x96(), Q96 * 2);
        assert_eq!(client.tick(), 13863);
        assert_eq!(client.liquidity(), 0);
        assert_eq!(client.token0(), t0);
        assert_eq!(client.token1(), t1);
        assert_eq!(client.fee(), 500);
        assert_eq!(client.tick_spacing(), 10);
        assert!(!client.get_tick(&100).initialized);
        assert_eq!(client.get_tick_bitmap_word(&0), 0);
    }

    // === Mint ===

    #[test]
    fn test_mint_in_range() {
        let env = Env::default();
        let s = setup(&env);

        let (amount0, amount1) = s.pool.mint(&s.user, &-600, &600, &ONE);

        // Symmetric range around price 1 needs equal amounts of both tokens
        assert!(amount0 > 0);
        assert_eq!(amount0, amount1);
        assert_eq!(s.pool.liquidity(), ONE);
        assert_eq!(balance(&env, &s.token0, &s.pool.address), amount0 as i128);
        assert_eq!(balance(&env, &s.token1, &s.pool.address), amount1 as i128);

        assert_eq!(s.pool.get_tick(&-600).liquidity_net, ONE as i128);
        assert_eq!(s.pool.get_tick(&600).liquidity_net, -(ONE as i128));
        // -600 / 60 = -10 -> word -1 bit 118; 600 / 60 = 10 -> word 0 bit 10
        assert_eq!(s.pool.get_tick_bitmap_word(&-1), 1u128 << 118);
        assert_eq!(s.pool.get_tick_bitmap_word(&0), 1u128 << 10);

        let position = s.pool.get_position(&s.user, &-600, &600);
        assert_eq!(position.liquidity, ONE);
    }

    #[test]
    fn test_repeat_mint_accumulates_position() {
        let env = Env::default();
        let s = setup(&env);

        s.pool.mint(&s.user, &-600, &600, &ONE);
        s.pool.swap(&s.user, &true, &1000, &0);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        assert_eq!(
            s.pool.get_position(&s.user, &-600, &600),
            PositionInfo { liquidity: 2 * ONE }
        );
        assert_eq!(s.pool.liquidity(), 2 * ONE);
    }

    #[test]
    fn test_mint_above_range_is_token0_only() {
        let env = Env::default();
        let s = setup(&env);

        let (amount0, amount1) = s.pool.mint(&s.user, &600, &1200, &ONE);

        assert!(amount0 > 0);
        assert_eq!(amount1, 0);
        // Out of range liquidity is not active
        assert_eq!(s.pool.liquidity(), 0);
    }

    #[test]
    #[should_panic(expected = "Ticks not on spacing")]
    fn test_mint_off_spacing() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-610, &600, &ONE);
    }

    // === Swap ===

    #[test]
    fn test_swap_is_authorized_by_recipient() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        s.pool.swap(&s.user, &true, &1000, &0);

        let auths = env.auths();
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0].0, s.user);
    }

    #[test]
    #[should_panic]
    fn test_swap_without_recipient_auth_fails() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        env.set_auths(&[]);
        s.pool.swap(&s.user, &true, &1000, &0);
    }

    #[test]
    fn test_swap_exact_input_matches_quote() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        let amount_in = (ONE / 1000) as i128;
        let state_before = s.pool.get_state();
        let quote = s.pool.quote_swap(&true, &amount_in, &0);
        assert_eq!(s.pool.get_state(), state_before);

        let user0_before = balance(&env, &s.token0, &s.user);
        let user1_before = balance(&env, &s.token1, &s.user);
        let (amount0, amount1) = s.pool.swap(&s.user, &true, &amount_in, &0);

        assert_eq!((amount0, amount1), quote);
        assert_eq!(amount0, amount_in);
        assert!(amount1 < 0);
        assert_eq!(balance(&env, &s.token0, &s.user), user0_before - amount0);
        assert_eq!(balance(&env, &s.token1, &s.user), user1_before - amount1);

        let state = s.pool.get_state();
        assert!(state.sqrt_price_x96 < state_before.sqrt_price_x96);
        assert!(state.fee_growth_global_0_x128 > 0);
        assert_eq!(state.fee_growth_global_1_x128, 0);
    }

    #[test]
    fn test_swap_exact_output() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        let amount_out = (ONE / 1000) as i128;
        let quote = s.pool.quote_swap(&false, &-amount_out, &0);
        let (amount0, amount1) = s.pool.swap(&s.user, &false, &-amount_out, &0);

        assert_eq!((amount0, amount1), quote);
        assert_eq!(amount0, -amount_out);
        assert!(amount1 > amount_out);
        assert!(s.pool.tick() >= 0);
    }

    #[test]
    fn test_swap_crosses_tick_and_stops_at_limit() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        let limit = dex_math::get_sqrt_ratio_at_tick(&env, -1200);
        let (amount0, amount1) = s.pool.swap(&s.user, &true, &(ONE as i128), &limit);

        // Liquidity runs out at -600; the rest of the input is not taken
        assert!(amount0 > 0 && amount0 < ONE as i128);
        assert!(amount1 < 0);
        assert_eq!(s.pool.liquidity(), 0);
        assert_eq!(s.pool.sqrt_price_x96(), limit);
        assert_eq!(s.pool.tick(), -1200);

        // Crossing flipped fee growth outside to the global value at the time
        let state = s.pool.get_state();
        let crossed = s.pool.get_tick(&-600);
        assert_eq!(crossed.fee_growth_outside_0_x128, state.fee_growth_global_0_x128);
    }

    #[test]
    fn test_swap_round_trip_returns_to_range() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);

        let limit = dex_math::get_sqrt_ratio_at_tick(&env, -1200);
        s.pool.swap(&s.user, &true, &(ONE as i128), &limit);
        assert_eq!(s.pool.liquidity(), 0);

        // Swapping back re-enters the range and re-activates the liquidity
        s.pool.swap(&s.user, &false, &((ONE / 100) as i128), &0);
        assert_eq!(s.pool.liquidity(), ONE);
        assert!(s.pool.tick() >= -600);
    }

    #[test]
    #[should_panic(expected = "Amount must be non-zero")]
    fn test_swap_zero_amount() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.swap(&s.user, &true, &0, &0);
    }

    #[test]
    #[should_panic(expected = "Invalid price limit")]
    fn test_swap_limit_on_wrong_side() {
        let env = Env::default();
        let s = setup(&env);
        s.pool.mint(&s.user, &-600, &600, &ONE);
        s.pool.swap(&s.user, &true, &1000, &(Q96 * 2));
    }
}
