use soroban_sdk::contracterror;

/// Failures a quote can return to its caller
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum QuoterError {
    /// Malformed path, or encode inputs that do not describe a path
    InvalidPath = 1,
    /// The registry has no pool for the pair and fee
    PoolNotFound = 2,
    /// The dry run failed without producing amounts
    Execution = 3,
    /// The dry run needed more steps than the configured budget
    OutOfResources = 4,
    /// Negative amount
    InvalidAmount = 5,
    NotInitialized = 6,
    AlreadyInitialized = 7,
}
