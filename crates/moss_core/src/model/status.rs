//! Checked value sets mirrored from schema CHECK constraints.
//!
//! # Invariants
//! - `ALL` lists and `as_db_str` values match the SQL CHECK lists exactly.

use serde::{Deserialize, Serialize};

/// IUCN Red List category stored in `MOSS.CONSERVATION_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConservationStatus {
    #[serde(rename = "EX")]
    Extinct,
    #[serde(rename = "EW")]
    ExtinctInTheWild,
    #[serde(rename = "CR")]
    CriticallyEndangered,
    #[serde(rename = "EN")]
    Endangered,
    #[serde(rename = "VU")]
    Vulnerable,
    #[serde(rename = "NT")]
    NearThreatened,
    /// Legacy "conservation dependent" category (pre-2001 criteria).
    #[serde(rename = "CD")]
    ConservationDependent,
    #[serde(rename = "LC")]
    LeastConcern,
    #[serde(rename = "DD")]
    DataDeficient,
    #[serde(rename = "NE")]
    NotEvaluated,
}

impl ConservationStatus {
    pub const ALL: [Self; 10] = [
        Self::Extinct,
        Self::ExtinctInTheWild,
        Self::CriticallyEndangered,
        Self::Endangered,
        Self::Vulnerable,
        Self::NearThreatened,
        Self::ConservationDependent,
        Self::LeastConcern,
        Self::DataDeficient,
        Self::NotEvaluated,
    ];

    /// Two-letter IUCN code.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Extinct => "EX",
            Self::ExtinctInTheWild => "EW",
            Self::CriticallyEndangered => "CR",
            Self::Endangered => "EN",
            Self::Vulnerable => "VU",
            Self::NearThreatened => "NT",
            Self::ConservationDependent => "CD",
            Self::LeastConcern => "LC",
            Self::DataDeficient => "DD",
            Self::NotEvaluated => "NE",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_db_str() == value)
    }
}

/// Academic degree stored in `EXPERT.DEGREE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpertDegree {
    Phd,
    Bs,
    Ba,
    Ms,
}

impl ExpertDegree {
    pub const ALL: [Self; 4] = [Self::Phd, Self::Bs, Self::Ba, Self::Ms];

    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Phd => "PHD",
            Self::Bs => "BS",
            Self::Ba => "BA",
            Self::Ms => "MS",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|degree| degree.as_db_str() == value)
    }
}

/// Expert verdict on a sighting, stored in `CONFIRMS.CONFIRMATION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfirmationStatus {
    Confirmed,
    Denied,
    Pending,
    Unsure,
}

impl ConfirmationStatus {
    pub const ALL: [Self; 4] = [
        Self::Confirmed,
        Self::Denied,
        Self::Pending,
        Self::Unsure,
    ];

    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Denied => "DENIED",
            Self::Pending => "PENDING",
            Self::Unsure => "UNSURE",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_db_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfirmationStatus, ConservationStatus, ExpertDegree};

    #[test]
    fn conservation_codes_roundtrip_through_db_strings() {
        for status in ConservationStatus::ALL {
            assert_eq!(
                ConservationStatus::parse_db(status.as_db_str()),
                Some(status)
            );
        }
        assert_eq!(ConservationStatus::parse_db("XX"), None);
        assert_eq!(ConservationStatus::parse_db("lc"), None);
    }

    #[test]
    fn serde_names_match_db_strings() {
        for status in ConservationStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_db_str()));
        }
        for degree in ExpertDegree::ALL {
            let json = serde_json::to_string(&degree).unwrap();
            assert_eq!(json, format!("\"{}\"", degree.as_db_str()));
        }
        for status in ConfirmationStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_db_str()));
        }
    }

    #[test]
    fn degree_and_confirmation_reject_unknown_values() {
        assert_eq!(ExpertDegree::parse_db("MBA"), None);
        assert_eq!(ExpertDegree::parse_db("PHD"), Some(ExpertDegree::Phd));
        assert_eq!(ConfirmationStatus::parse_db("MAYBE"), None);
        assert_eq!(
            ConfirmationStatus::parse_db("PENDING"),
            Some(ConfirmationStatus::Pending)
        );
    }
}
