//! STRIDE threat categories

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serialized by display label; deserialized through [`FromStr`], so config
/// files may also use codes or snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StrideCategory {
    Spoofing,
    Tampering,
    Repudiation,
    #[serde(rename = "Information Disclosure")]
    InformationDisclosure,
    #[serde(rename = "Denial of Service")]
    DenialOfService,
    #[serde(rename = "Elevation of Privilege")]
    ElevationOfPrivilege,
}

impl StrideCategory {
    /// All six categories in taxonomy order
    pub const ALL: [StrideCategory; 6] = [
        StrideCategory::Spoofing,
        StrideCategory::Tampering,
        StrideCategory::Repudiation,
        StrideCategory::InformationDisclosure,
        StrideCategory::DenialOfService,
        StrideCategory::ElevationOfPrivilege,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrideCategory::Spoofing => "Spoofing",
            StrideCategory::Tampering => "Tampering",
            StrideCategory::Repudiation => "Repudiation",
            StrideCategory::InformationDisclosure => "Information Disclosure",
            StrideCategory::DenialOfService => "Denial of Service",
            StrideCategory::ElevationOfPrivilege => "Elevation of Privilege",
        }
    }

    /// Single-letter STRIDE code
    pub fn code(&self) -> char {
        match self {
            StrideCategory::Spoofing => 'S',
            StrideCategory::Tampering => 'T',
            StrideCategory::Repudiation => 'R',
            StrideCategory::InformationDisclosure => 'I',
            StrideCategory::DenialOfService => 'D',
            StrideCategory::ElevationOfPrivilege => 'E',
        }
    }
}

impl fmt::Display for StrideCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown STRIDE category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for StrideCategory {
    type Err = UnknownCategory;

    /// Accepts the full label (any case, spaces/underscores/dashes ignored) or the letter code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "s" | "spoofing" => Ok(StrideCategory::Spoofing),
            "t" | "tampering" => Ok(StrideCategory::Tampering),
            "r" | "repudiation" => Ok(StrideCategory::Repudiation),
            "i" | "informationdisclosure" => Ok(StrideCategory::InformationDisclosure),
            "d" | "denialofservice" => Ok(StrideCategory::DenialOfService),
            "e" | "elevationofprivilege" => Ok(StrideCategory::ElevationOfPrivilege),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for StrideCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_codes() {
        assert_eq!(
            "Information Disclosure".parse::<StrideCategory>(),
            Ok(StrideCategory::InformationDisclosure)
        );
        assert_eq!(
            "denial_of_service".parse::<StrideCategory>(),
            Ok(StrideCategory::DenialOfService)
        );
        assert_eq!("E".parse::<StrideCategory>(), Ok(StrideCategory::ElevationOfPrivilege));
        assert!("Phishing".parse::<StrideCategory>().is_err());
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&StrideCategory::ElevationOfPrivilege).unwrap();
        assert_eq!(json, "\"Elevation of Privilege\"");
        let back: StrideCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StrideCategory::ElevationOfPrivilege);
    }

    #[test]
    fn test_unknown_category_error() {
        let err = serde_json::from_str::<StrideCategory>("\"Phishing\"").unwrap_err();
        assert!(err.to_string().contains("unknown STRIDE category 'Phishing'"));
        assert_eq!(
            "Phishing".parse::<StrideCategory>().unwrap_err().to_string(),
            "unknown STRIDE category 'Phishing'"
        );
    }
}
