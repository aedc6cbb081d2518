//! Engine configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose.
//! The defaults reproduce the live game's balance; a TOML file can override
//! them for test rounds.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Tunables for the conflict-resolution pipeline
///
/// These values have been tuned over many rounds. Changing them shifts the
/// attacker/defender balance and the pacing of espionage play.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === INVASION OUTCOME ===
    /// Failing an invasion by this fraction of the defense (or more) means
    /// the attacker is overwhelmed: doubled attacker casualties, zero
    /// defender casualties.
    pub overwhelmed_threshold: f64,

    // === CASUALTIES ===
    /// Offensive casualties as a fraction of the units needed to break the
    /// target (successful invasions) or of every committed slot (failures).
    pub offensive_casualty_rate: f64,

    /// Base defensive casualty fraction, before land-ratio and OP/DP scaling.
    pub defensive_casualty_base: f64,

    /// Hard cap on the defensive casualty fraction after all scaling.
    pub defensive_casualty_max: f64,

    // === LAND ===
    /// Minimum acres a successful invasion always takes.
    pub min_acres_conquered: i64,

    /// Conquered acres generate this much total land for the attacker
    /// (1.6667 = conquered plus a 66.67% newly-created bonus).
    pub bonus_land_ratio: f64,

    /// Hours conquered and generated land spends in transit.
    pub land_return_hours: u32,

    // === PRESTIGE ===
    /// Cap on the target-prestige-derived component of the attacker's gain.
    pub prestige_cap: f64,

    /// Flat prestige added on any qualifying successful invasion.
    pub prestige_add: f64,

    /// Base prestige fraction lost by the loser of a prestige swing.
    pub prestige_change_rate: f64,

    /// Extra prestige-loss fraction per time the target was invaded in the
    /// trailing week, and the cap on the total.
    pub prestige_loss_per_invasion: f64,
    pub prestige_loss_cap: f64,

    // === BOATS ===
    /// Units carried per boat.
    pub boat_capacity: i64,

    /// Base fraction of unprotected boats sunk by a full sinking force.
    pub boats_sunk_rate: f64,

    /// Boats shielded from sinking per dock.
    pub boats_protected_per_dock: f64,

    // === PRECONDITIONS ===
    /// Morale required to launch an invasion.
    pub min_morale_to_invade: i64,

    /// Wizard strength required to cast any spell, and the floor below which
    /// further target spells are refused mid-transaction.
    pub min_wizard_strength: f64,

    /// Hostile spells are disabled for this many hours after round start.
    pub black_ops_gate_hours: u32,

    // === RECENCY WINDOWS ===
    /// Trailing window (hours) for the repeat-invasion check.
    pub repeat_invasion_window: u32,

    /// Trailing window (hours) for weekly prestige penalties.
    pub weekly_window: u32,

    /// Window (hours) in which a recent invader stays a valid retaliation
    /// target regardless of range.
    pub retaliation_window: u32,

    // === SPECIALIST LEDGER ===
    /// Infamy lost per hour, before the mastery floor.
    pub infamy_decay: i64,

    /// Resilience gained per qualifying op and lost per hour.
    pub spy_resilience_gain: i64,
    pub wizard_resilience_gain: i64,
    pub resilience_decay: i64,

    // === CONVERSIONS ===
    /// Fraction of a converting force that raises new units per invasion.
    pub conversion_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overwhelmed_threshold: 0.15,

            offensive_casualty_rate: 0.085,
            defensive_casualty_base: 0.045,
            defensive_casualty_max: 0.06,

            min_acres_conquered: 10,
            bonus_land_ratio: 1.6667,
            land_return_hours: 12,

            prestige_cap: 130.0,
            prestige_add: 20.0,
            prestige_change_rate: 0.05,
            prestige_loss_per_invasion: 0.01,
            prestige_loss_cap: 0.15,

            boat_capacity: 30,
            boats_sunk_rate: 0.05,
            boats_protected_per_dock: 2.5,

            min_morale_to_invade: 70,
            min_wizard_strength: 30.0,
            black_ops_gate_hours: 72,

            repeat_invasion_window: 8,
            weekly_window: 24 * 7,
            retaliation_window: 12,

            infamy_decay: 20,
            spy_resilience_gain: 8,
            wizard_resilience_gain: 11,
            resilience_decay: 8,

            conversion_rate: 0.06,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a TOML file
    pub fn from_toml(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&text)?;
        config.validate().map_err(crate::core::error::EngineError::Invariant)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..1.0).contains(&self.overwhelmed_threshold) {
            return Err(format!(
                "overwhelmed_threshold ({}) must be in [0, 1)",
                self.overwhelmed_threshold
            ));
        }
        if self.defensive_casualty_base > self.defensive_casualty_max {
            return Err(format!(
                "defensive_casualty_base ({}) should be <= defensive_casualty_max ({})",
                self.defensive_casualty_base, self.defensive_casualty_max
            ));
        }
        if self.bonus_land_ratio < 1.0 {
            return Err("bonus_land_ratio must be >= 1.0 (conquered land is never shrunk)".into());
        }
        if self.boat_capacity <= 0 {
            return Err("boat_capacity must be positive".into());
        }
        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Get the global engine config (initializes with defaults if not set)
pub fn config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

/// Set the global engine config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: EngineConfig) -> std::result::Result<(), EngineConfig> {
    CONFIG.set(config)
}
