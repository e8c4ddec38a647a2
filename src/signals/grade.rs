//! Letter grade ordinal.
//!
//! A+ ranks 12 down to F at 1. A grade that is missing or not one of the
//! known letters ranks 0, so it only clears a minimum of "none".

use serde::{Deserialize, Deserializer, Serialize};

/// Setup grade assigned by the scanner, worst first so derived `Ord` follows rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl LetterGrade {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "A-" => Some(Self::AMinus),
            "B+" => Some(Self::BPlus),
            "B" => Some(Self::B),
            "B-" => Some(Self::BMinus),
            "C+" => Some(Self::CPlus),
            "C" => Some(Self::C),
            "C-" => Some(Self::CMinus),
            "D+" => Some(Self::DPlus),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Ordinal rank, 12 (A+) to 1 (F).
    pub fn rank(&self) -> u8 {
        match self {
            Self::APlus => 12,
            Self::A => 11,
            Self::AMinus => 10,
            Self::BPlus => 9,
            Self::B => 8,
            Self::BMinus => 7,
            Self::CPlus => 6,
            Self::C => 5,
            Self::CMinus => 4,
            Self::DPlus => 3,
            Self::D => 2,
            Self::F => 1,
        }
    }

    /// Rank of a possibly unknown grade.
    pub fn rank_of(grade: Option<Self>) -> u8 {
        grade.map_or(0, |g| g.rank())
    }

    pub fn is_a_family(&self) -> bool {
        matches!(self, Self::APlus | Self::A | Self::AMinus)
    }

    pub fn is_c_family(&self) -> bool {
        matches!(self, Self::CPlus | Self::C | Self::CMinus)
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deserialize an optional grade, mapping unrecognized letters to `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<LetterGrade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(LetterGrade::parse))
}
