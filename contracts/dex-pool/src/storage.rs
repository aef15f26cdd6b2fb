use dex_types::{PoolConfig, PoolState, PositionInfo, PositionKey, TickInfo};
use soroban_sdk::{contracttype, Env, IntoVal, TryFromVal, Val};

// Config and State sit in instance storage. Ticks, bitmap words and
// positions each get a persistent entry that is dropped once it is empty, so
// a swap writes one entry per initialized tick it crosses.

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    State,
    Tick(i32),
    TickBitmap(i32),
    Position(PositionKey),
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

fn write_instance<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    let instance = env.storage().instance();
    instance.set(key, value);
    instance.extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn read_instance<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> V {
    env.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| panic!("Pool not initialized"))
}

fn read_entry<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
    env.storage().persistent().get(key)
}

/// Store `value` under `key`, or drop the entry when `empty`
fn write_entry<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V, empty: bool) {
    let persistent = env.storage().persistent();
    if empty {
        persistent.remove(key);
    } else {
        persistent.set(key, value);
        persistent.extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> PoolConfig {
    read_instance(env, &DataKey::Config)
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    write_instance(env, &DataKey::Config, config);
}

pub fn get_state(env: &Env) -> PoolState {
    read_instance(env, &DataKey::State)
}

pub fn set_state(env: &Env, state: &PoolState) {
    write_instance(env, &DataKey::State, state);
}

pub fn get_tick(env: &Env, tick: i32) -> TickInfo {
    read_entry(env, &DataKey::Tick(tick)).unwrap_or_default()
}

pub fn set_tick(env: &Env, tick: i32, info: &TickInfo) {
    let empty = info.liquidity_gross == 0 && !info.initialized;
    write_entry(env, &DataKey::Tick(tick), info, empty);
}

pub fn get_tick_bitmap_word(env: &Env, word_pos: i32) -> u128 {
    read_entry(env, &DataKey::TickBitmap(word_pos)).unwrap_or(0)
}

pub fn set_tick_bitmap_word(env: &Env, word_pos: i32, word: u128) {
    write_entry(env, &DataKey::TickBitmap(word_pos), &word, word == 0);
}

pub fn get_position(env: &Env, key: &PositionKey) -> PositionInfo {
    read_entry(env, &DataKey::Position(key.clone())).unwrap_or_default()
}

pub fn set_position(env: &Env, key: &PositionKey, info: &PositionInfo) {
    write_entry(env, &DataKey::Position(key.clone()), info, info.liquidity == 0);
}
