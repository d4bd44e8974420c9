//! Threat records produced by the engine, and run summaries

use crate::engine::StrideCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The five DREAD factors, each on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DreadSubscores {
    #[serde(rename = "Damage")]
    pub damage: f64,
    #[serde(rename = "Reproducibility")]
    pub reproducibility: f64,
    #[serde(rename = "Exploitability")]
    pub exploitability: f64,
    #[serde(rename = "AffectedUsers")]
    pub affected_users: f64,
    #[serde(rename = "Discoverability")]
    pub discoverability: f64,
}

/// A single scored threat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    /// Node id, or `flow_<source>_to_<target>` for flows
    pub component: String,

    /// Kind of the element (`dataflow` for flows)
    pub component_type: String,

    #[serde(rename = "stride")]
    pub category: StrideCategory,

    /// Weighted DREAD score in [0, 10], two decimals
    pub dread_score: f64,

    pub dread_subscores: DreadSubscores,

    #[serde(rename = "suggested_mitigation")]
    pub mitigation: String,
}

impl Threat {
    pub fn is_flow(&self) -> bool {
        self.component_type == crate::engine::mitigation::DATAFLOW_KIND
    }
}

/// Aggregate view of a threat list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub total: usize,
    pub spoofing: usize,
    pub tampering: usize,
    pub repudiation: usize,
    pub information_disclosure: usize,
    pub denial_of_service: usize,
    pub elevation_of_privilege: usize,
    pub max_score: f64,
    pub components_scored: usize,
    pub flows_scored: usize,
}

impl ThreatSummary {
    pub fn from_threats(threats: &[Threat]) -> Self {
        let mut summary = Self::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for threat in threats {
            summary.total += 1;
            *summary.count_mut(threat.category) += 1;
            summary.max_score = summary.max_score.max(threat.dread_score);
            if threat.is_flow() {
                summary.flows_scored += 1;
            } else {
                seen.insert(&threat.component);
            }
        }
        summary.components_scored = seen.len();
        summary
    }

    pub fn count(&self, category: StrideCategory) -> usize {
        match category {
            StrideCategory::Spoofing => self.spoofing,
            StrideCategory::Tampering => self.tampering,
            StrideCategory::Repudiation => self.repudiation,
            StrideCategory::InformationDisclosure => self.information_disclosure,
            StrideCategory::DenialOfService => self.denial_of_service,
            StrideCategory::ElevationOfPrivilege => self.elevation_of_privilege,
        }
    }

    fn count_mut(&mut self, category: StrideCategory) -> &mut usize {
        match category {
            StrideCategory::Spoofing => &mut self.spoofing,
            StrideCategory::Tampering => &mut self.tampering,
            StrideCategory::Repudiation => &mut self.repudiation,
            StrideCategory::InformationDisclosure => &mut self.information_disclosure,
            StrideCategory::DenialOfService => &mut self.denial_of_service,
            StrideCategory::ElevationOfPrivilege => &mut self.elevation_of_privilege,
        }
    }

    /// Check whether the run should fail a CI gate.
    ///
    /// A threshold of zero or below disables the gate; otherwise the run
    /// fails when any threat scores at or above `min_score`.
    pub fn exceeds_threshold(&self, min_score: f64) -> bool {
        min_score > 0.0 && self.total > 0 && self.max_score >= min_score
    }
}
