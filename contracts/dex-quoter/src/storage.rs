use crate::error::QuoterError;
use crate::types::QuoterConfig;
use soroban_sdk::{contracttype, Env};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Quoter configuration (Instance storage), written once
    Config,
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<QuoterConfig, QuoterError> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(QuoterError::NotInitialized)?;
    extend_instance_ttl(env);
    Ok(config)
}

pub fn set_config(env: &Env, config: &QuoterConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}
