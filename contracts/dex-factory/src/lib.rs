#![no_std]

use dex_types::{Fee, PoolConfig, DEFAULT_FEE_TIERS};
use soroban_sdk::{contract, contractimpl, contracttype, Address, BytesN, Env, IntoVal, Symbol};

#[contract]
pub struct DexFactory;

/// Storage keys for Factory contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Pool WASM hash for deployment
    PoolWasmHash,
    /// Fee tier -> tick spacing mapping
    FeeTickSpacing(u32),
    /// (token0, token1, fee) -> pool address
    Pool(Address, Address, u32),
    /// Number of pools known to the registry
    PoolCount,
    /// Pool address at index
    PoolAt(u32),
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

// Pool i of the listing is stored under PoolAt(i), i < PoolCount

#[contractimpl]
impl DexFactory {
    /// Initialize factory with admin and pool WASM hash
    pub fn initialize(env: Env, admin: Address, pool_wasm_hash: BytesN<32>) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Already initialized");
        }

        admin.require_auth();

        let storage = env.storage().instance();
        storage.set(&DataKey::Admin, &admin);
        storage.set(&DataKey::PoolWasmHash, &pool_wasm_hash);
        for (fee, tick_spacing) in DEFAULT_FEE_TIERS {
            storage.set(&DataKey::FeeTickSpacing(fee), &tick_spacing);
        }
        storage.set(&DataKey::PoolCount, &0u32);

        extend_instance_ttl(&env);
    }

    /// Deploy and initialize a pool for a token pair and fee tier
    pub fn create_pool(
        env: Env,
        token_a: Address,
        token_b: Address,
        fee: Fee,
        initial_sqrt_price_x96: u128,
    ) -> Address {
        let (token0, token1) = sort_tokens(token_a, token_b);
        if token0 == token1 {
            panic!("Identical tokens");
        }

        let pool_key = DataKey::Pool(token0.clone(), token1.clone(), fee);
        if env.storage().persistent().has(&pool_key) {
            panic!("Pool already exists");
        }

        let tick_spacing = Self::get_fee_tick_spacing(env.clone(), fee);
        if tick_spacing == 0 {
            panic!("Fee not enabled");
        }

        let pool_wasm_hash: BytesN<32> = env
            .storage()
            .instance()
            .get(&DataKey::PoolWasmHash)
            .unwrap_or_else(|| panic!("Not initialized"));

        // Salt from pool index and fee keeps deployments deterministic
        let pool_count = Self::get_pool_count(env.clone());
        let mut salt_bytes = [0u8; 32];
        salt_bytes[0..4].copy_from_slice(&pool_count.to_be_bytes());
        salt_bytes[4..8].copy_from_slice(&fee.to_be_bytes());
        let salt = BytesN::from_array(&env, &salt_bytes);

        let pool_address = env
            .deployer()
            .with_current_contract(salt)
            .deploy_v2(pool_wasm_hash, ());

        env.invoke_contract::<()>(
            &pool_address,
            &Symbol::new(&env, "initialize"),
            (
                env.current_contract_address(),
                token0.clone(),
                token1.clone(),
                fee,
                tick_spacing,
                initial_sqrt_price_x96,
            )
                .into_val(&env),
        );

        record_pool(&env, pool_key, &pool_address);

        env.events().publish(
            (Symbol::new(&env, "pool_created"),),
            (token0, token1, fee, pool_address.clone()),
        );

        pool_address
    }

    /// Adopt an already deployed and initialized pool (admin only).
    ///
    /// The pool must name this factory, use an enabled fee tier with its
    /// tick spacing, and trade a pair/fee that has no pool yet.
    pub fn register_pool(env: Env, pool: Address) {
        read_admin(&env).require_auth();

        let config: PoolConfig =
            env.invoke_contract(&pool, &Symbol::new(&env, "get_config"), ().into_val(&env));

        if config.factory != env.current_contract_address() {
            panic!("Pool belongs to another factory");
        }
        let tick_spacing = Self::get_fee_tick_spacing(env.clone(), config.fee);
        if tick_spacing == 0 {
            panic!("Fee not enabled");
        }
        if tick_spacing != config.tick_spacing {
            panic!("Tick spacing mismatch");
        }

        let pool_key = DataKey::Pool(config.token0.clone(), config.token1.clone(), config.fee);
        if env.storage().persistent().has(&pool_key) {
            panic!("Pool already exists");
        }

        record_pool(&env, pool_key, &pool);

        env.events().publish(
            (Symbol::new(&env, "pool_registered"),),
            (config.token0, config.token1, config.fee, pool),
        );
    }

    /// Pool address for a token pair and fee, in either token order
    pub fn get_pool(env: Env, token_a: Address, token_b: Address, fee: Fee) -> Option<Address> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        env.storage()
            .persistent()
            .get(&DataKey::Pool(token0, token1, fee))
    }

    /// Enable a new fee tier
    pub fn enable_fee_amount(env: Env, fee: Fee, tick_spacing: i32) {
        read_admin(&env).require_auth();

        if tick_spacing <= 0 || tick_spacing > 16384 {
            panic!("Invalid tick spacing");
        }
        if fee >= 1_000_000 {
            panic!("Fee too high");
        }

        let key = DataKey::FeeTickSpacing(fee);
        if env.storage().instance().has(&key) {
            panic!("Fee already enabled");
        }

        env.storage().instance().set(&key, &tick_spacing);
        extend_instance_ttl(&env);
    }

    /// Tick spacing for a fee tier, 0 if the tier is not enabled
    pub fn get_fee_tick_spacing(env: Env, fee: Fee) -> i32 {
        extend_instance_ttl(&env);
        env.storage()
            .instance()
            .get(&DataKey::FeeTickSpacing(fee))
            .unwrap_or(0)
    }

    pub fn get_pool_count(env: Env) -> u32 {
        extend_instance_ttl(&env);
        env.storage()
            .instance()
            .get(&DataKey::PoolCount)
            .unwrap_or(0)
    }

    pub fn get_pool_at(env: Env, index: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::PoolAt(index))
    }

    pub fn get_admin(env: Env) -> Address {
        extend_instance_ttl(&env);
        read_admin(&env)
    }
}

fn read_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .unwrap_or_else(|| panic!("Not initialized"))
}

fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Store a pool under its pair key and append it to the index
fn record_pool(env: &Env, pool_key: DataKey, pool: &Address) {
    env.storage().persistent().set(&pool_key, pool);
    extend_persistent_ttl(env, &pool_key);

    let pool_count: u32 = env
        .storage()
        .instance()
        .get(&DataKey::PoolCount)
        .unwrap_or(0);
    let pool_at_key = DataKey::PoolAt(pool_count);
    env.storage().persistent().set(&pool_at_key, pool);
    extend_persistent_ttl(env, &pool_at_key);

    env.storage()
        .instance()
        .set(&DataKey::PoolCount, &(pool_count + 1));
    extend_instance_ttl(env);
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
