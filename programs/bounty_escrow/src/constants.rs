// Centralized Protocol Constants

// Seeds
// =====

pub const BOUNTY_SEED: &[u8] = b"bounty_v1";
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault_v1";
pub const FLOOR_RESERVE_SEED: &[u8] = b"floor_reserve_v1";
pub const USED_NONCE_SEED: &[u8] = b"used_nonce_v1";
pub const PAYOUT_SEED: &[u8] = b"payout_v1";

// Revenue split
// =============

/// Basis points denominator. 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum number of shares in a revenue split, pool share included.
/// Fixed so the Bounty account size stays deterministic.
pub const MAX_SPLIT_SHARES: usize = 8;

// Time windows (unix seconds)
// ===========================

/// Default inactivity timeout before anyone may roll the bounty over.
pub const DEFAULT_TIMEOUT_DURATION: i64 = 24 * 60 * 60;

/// Default validity window for a signed decision.
pub const DEFAULT_FRESHNESS_WINDOW: i64 = 60 * 60;

/// Upper bound accepted for a bounty's freshness window.
pub const MAX_FRESHNESS_WINDOW: i64 = 24 * 60 * 60;

// Emergency recovery
// ==================

/// Minimum time between two emergency recoveries.
pub const RECOVERY_COOLDOWN: i64 = 24 * 60 * 60;

/// Max share (percent) of the pool above the floor that one recovery may move.
pub const MAX_RECOVERY_PERCENT: u64 = 10;

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;
