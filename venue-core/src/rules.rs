use serde::Deserialize;

/// Tunable business rules for the booking and ledger engine. Loaded from
/// configuration by the store crate; defaults match production.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineRules {
    /// Prefix for gift card redemption codes (`PREFIX-<n>`).
    #[serde(default = "default_code_prefix")]
    pub gift_card_code_prefix: String,
    /// Bounded retry count for code/PIN generation. Exhausting it is a
    /// systemic capacity problem, not a user error.
    #[serde(default = "default_generation_attempts")]
    pub generation_max_attempts: u32,
    /// Bounded retry count for compare-and-swap balance updates.
    #[serde(default = "default_redeem_attempts")]
    pub redeem_retry_attempts: u32,
    /// Upper bound on an outbound notification attempt.
    #[serde(default = "default_notify_timeout")]
    pub notification_timeout_ms: u64,
}

fn default_code_prefix() -> String {
    "GC".to_string()
}

fn default_generation_attempts() -> u32 {
    25
}

fn default_redeem_attempts() -> u32 {
    3
}

fn default_notify_timeout() -> u64 {
    2_000
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            gift_card_code_prefix: default_code_prefix(),
            generation_max_attempts: default_generation_attempts(),
            redeem_retry_attempts: default_redeem_attempts(),
            notification_timeout_ms: default_notify_timeout(),
        }
    }
}
