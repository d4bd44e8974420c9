//! Mitigation suggestions keyed on (category, element kind)

use super::StrideCategory;
use crate::graph::DATASTORE_KIND;

/// Kind used for flow threats
pub const DATAFLOW_KIND: &str = "dataflow";

/// Suggestion attached to every flow threat
pub const FLOW_MITIGATION: &str = "Encrypt the data in transit and validate endpoints";

/// Pick the mitigation text for a threat on `id` of the given kind.
///
/// Data stores should be looked up with [`DATASTORE_KIND`] whatever their
/// declared kind, so a bucket and a schema get the same advice.
pub fn suggest_mitigation(category: StrideCategory, kind: &str, id: &str) -> String {
    use StrideCategory::*;

    match (category, kind) {
        (Spoofing, "api" | "function") => format!("Use OAuth2/JWT authentication for {}", id),
        (Spoofing, _) => "Enforce authentication for user or system access".to_string(),

        (Tampering, DATASTORE_KIND) => {
            format!("Enable integrity checks and encryption at rest for {}", id)
        }
        (Tampering, DATAFLOW_KIND) => format!("Sign and validate messages in flow {}", id),
        (Tampering, _) => "Use code signing and integrity verification".to_string(),

        (Repudiation, _) => "Enable audit logging and immutable logs for all actions".to_string(),

        (InformationDisclosure, DATASTORE_KIND) => {
            format!("Encrypt sensitive data in {} and apply access control", id)
        }
        (InformationDisclosure, "api") => "Enforce HTTPS and input/output validation".to_string(),
        (InformationDisclosure, _) => "Restrict sensitive data exposure".to_string(),

        (DenialOfService, "api") => format!("Rate-limit API calls and implement retries for {}", id),
        (DenialOfService, _) => "Implement resource limits and redundancy".to_string(),

        (ElevationOfPrivilege, "function" | "class") => {
            format!("Apply least privilege and RBAC in {}", id)
        }
        (ElevationOfPrivilege, _) => "Review access permissions".to_string(),
    }
}
