//! Terminal output formatting

use colored::Colorize;
use threatmap_core::{StrideCategory, Threat, ThreatSummary};

/// Score at or above which a threat is shown as high risk
pub const HIGH_RISK: f64 = 5.0;
/// Score at or above which a threat is shown as medium risk
pub const MEDIUM_RISK: f64 = 4.0;

pub fn risk_icon(score: f64) -> &'static str {
    if score >= HIGH_RISK {
        "❌"
    } else if score >= MEDIUM_RISK {
        "⚠️ "
    } else {
        "ℹ️ "
    }
}

pub fn format_threat(threat: &Threat) -> String {
    let score = format!("{:>5.2}", threat.dread_score);
    let score = if threat.dread_score >= HIGH_RISK {
        score.red().bold()
    } else if threat.dread_score >= MEDIUM_RISK {
        score.yellow()
    } else {
        score.green()
    };

    format!(
        "  {} {} [{}] {} ({})\n       {} {}",
        risk_icon(threat.dread_score),
        score,
        threat.category.code(),
        threat.component.bold(),
        threat.component_type.dimmed(),
        "→".dimmed(),
        threat.mitigation
    )
}

pub fn format_summary(summary: &ThreatSummary) -> Vec<String> {
    let per_category: Vec<String> = StrideCategory::ALL
        .iter()
        .map(|c| format!("{}:{}", c.code(), summary.count(*c)))
        .collect();

    vec![
        format!(
            "  {} threat(s) \u{00b7} max score {:.2}",
            summary.total, summary.max_score
        ),
        format!(
            "  {} component(s) scored \u{00b7} {} flow(s) scored",
            summary.components_scored, summary.flows_scored
        ),
        format!("  {}", per_category.join("  ")),
    ]
}
