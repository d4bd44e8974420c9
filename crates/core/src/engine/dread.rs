//! DREAD sub-scores, weights and per-category base values

use super::StrideCategory;
use crate::threat::DreadSubscores;
use serde::{Deserialize, Serialize};

/// Kinds that count as reaching many users
const WIDE_REACH_KINDS: &[&str] = &["api", "component", "class", "function"];

/// Sub-score ceiling
pub const MAX_SUBSCORE: f64 = 10.0;

/// Weight of each DREAD factor in the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DreadWeights {
    #[serde(default = "default_damage_weight")]
    pub damage: f64,
    #[serde(default = "default_minor_weight")]
    pub reproducibility: f64,
    #[serde(default = "default_minor_weight")]
    pub exploitability: f64,
    #[serde(default = "default_minor_weight")]
    pub affected_users: f64,
    #[serde(default = "default_discoverability_weight")]
    pub discoverability: f64,
}

fn default_damage_weight() -> f64 {
    0.3
}

fn default_minor_weight() -> f64 {
    0.2
}

fn default_discoverability_weight() -> f64 {
    0.1
}

impl Default for DreadWeights {
    fn default() -> Self {
        Self {
            damage: default_damage_weight(),
            reproducibility: default_minor_weight(),
            exploitability: default_minor_weight(),
            affected_users: default_minor_weight(),
            discoverability: default_discoverability_weight(),
        }
    }
}

impl DreadWeights {
    pub fn total(&self) -> f64 {
        self.damage
            + self.reproducibility
            + self.exploitability
            + self.affected_users
            + self.discoverability
    }

    fn as_array(&self) -> [f64; 5] {
        [
            self.damage,
            self.reproducibility,
            self.exploitability,
            self.affected_users,
            self.discoverability,
        ]
    }

    /// Every weight is finite and non-negative and they do not all vanish
    pub fn is_valid(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0) && self.total() > 0.0
    }

    /// Weighted mean of the sub-scores, rounded to two decimals, within [0, 10]
    pub fn composite(&self, s: &DreadSubscores) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = s.damage * self.damage
            + s.reproducibility * self.reproducibility
            + s.exploitability * self.exploitability
            + s.affected_users * self.affected_users
            + s.discoverability * self.discoverability;
        round2(weighted / total).clamp(0.0, MAX_SUBSCORE)
    }
}

/// Base severity per STRIDE category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseScores {
    #[serde(default = "default_three")]
    pub spoofing: f64,
    #[serde(default = "default_three")]
    pub tampering: f64,
    #[serde(default = "default_two")]
    pub repudiation: f64,
    #[serde(default = "default_four")]
    pub information_disclosure: f64,
    #[serde(default = "default_four")]
    pub denial_of_service: f64,
    #[serde(default = "default_three")]
    pub elevation_of_privilege: f64,
}

fn default_two() -> f64 {
    2.0
}

fn default_three() -> f64 {
    3.0
}

fn default_four() -> f64 {
    4.0
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            spoofing: 3.0,
            tampering: 3.0,
            repudiation: 2.0,
            information_disclosure: 4.0,
            denial_of_service: 4.0,
            elevation_of_privilege: 3.0,
        }
    }
}

impl BaseScores {
    pub fn base(&self, category: StrideCategory) -> f64 {
        match category {
            StrideCategory::Spoofing => self.spoofing,
            StrideCategory::Tampering => self.tampering,
            StrideCategory::Repudiation => self.repudiation,
            StrideCategory::InformationDisclosure => self.information_disclosure,
            StrideCategory::DenialOfService => self.denial_of_service,
            StrideCategory::ElevationOfPrivilege => self.elevation_of_privilege,
        }
    }

    /// First category whose base lies outside 0..=10
    pub fn first_invalid(&self) -> Option<StrideCategory> {
        StrideCategory::ALL.into_iter().find(|c| {
            let base = self.base(*c);
            !(base.is_finite() && (0.0..=MAX_SUBSCORE).contains(&base))
        })
    }
}

/// Sub-scores for a node threat
pub fn node_subscores(base: f64, kind: &str) -> DreadSubscores {
    DreadSubscores {
        damage: (base + 3.0).min(MAX_SUBSCORE),
        reproducibility: base.min(MAX_SUBSCORE),
        exploitability: (base + 1.0).min(MAX_SUBSCORE),
        affected_users: if WIDE_REACH_KINDS.contains(&kind) { 5.0 } else { 2.0 },
        discoverability: if kind == "api" { 7.0 } else { 3.0 },
    }
}

/// Fixed profile used for every data flow
pub fn flow_subscores() -> DreadSubscores {
    DreadSubscores {
        damage: 6.0,
        reproducibility: 4.0,
        exploitability: 4.0,
        affected_users: 4.0,
        discoverability: 6.0,
    }
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
