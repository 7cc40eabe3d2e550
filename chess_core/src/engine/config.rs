use serde::{Deserialize, Serialize};

/// What to do with a submission while another search is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    #[default]
    Queue,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Transposition Table
    pub tt_capacity: usize,
    pub use_transposition_table: bool,

    // Search Parameters
    pub null_move_pruning: bool,
    pub null_move_reduction: u8,
    pub principal_variation_search: bool,
    pub quiescence: bool,
    pub mate_score: i32,
    pub max_depth: u8,
    pub time_check_interval: u64,

    // Execution
    pub busy_policy: BusyPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tt_capacity: 1_000_000,
            use_transposition_table: true,

            null_move_pruning: true,
            null_move_reduction: 2,
            principal_variation_search: true,
            quiescence: true,
            mate_score: 100_000,
            max_depth: 64,
            time_check_interval: 1024,

            busy_policy: BusyPolicy::Queue,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Settings that make the pruned search exactly equal to plain minimax.
    #[must_use]
    pub fn exact() -> Self {
        Self {
            null_move_pruning: false,
            ..Self::default()
        }
    }
}
