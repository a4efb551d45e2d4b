use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared recommendation strategy of a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    /// Price sensitive.
    Saver,
    /// Novelty seeking.
    Adventurer,
    Balanced,
}

impl RecommendationType {
    pub const ALL: [RecommendationType; 3] = [Self::Saver, Self::Adventurer, Self::Balanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saver => "SAVER",
            Self::Adventurer => "ADVENTURER",
            Self::Balanced => "BALANCED",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SAVER" => Ok(Self::Saver),
            "ADVENTURER" => Ok(Self::Adventurer),
            "BALANCED" => Ok(Self::Balanced),
            other => Err(DomainError::UnknownRecommendationType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub nickname: String,
    pub recommendation_type: RecommendationType,
}

impl Member {
    pub fn change_recommendation_type(&mut self, next: RecommendationType) {
        self.recommendation_type = next;
    }
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberId, RecommendationType};
    use crate::errors::DomainError;

    #[test]
    fn parses_recommendation_type_case_insensitively() {
        assert_eq!("saver".parse::<RecommendationType>(), Ok(RecommendationType::Saver));
        assert_eq!(" Adventurer ".parse::<RecommendationType>(), Ok(RecommendationType::Adventurer));
        assert_eq!("BALANCED".parse::<RecommendationType>(), Ok(RecommendationType::Balanced));
    }

    #[test]
    fn unknown_recommendation_type_fails_fast() {
        let error = "gourmet".parse::<RecommendationType>().expect_err("unknown persona");
        assert_eq!(error, DomainError::UnknownRecommendationType("GOURMET".to_string()));
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&RecommendationType::Adventurer).expect("serialize");
        assert_eq!(json, "\"ADVENTURER\"");
        assert!(serde_json::from_str::<RecommendationType>("\"FOODIE\"").is_err());
    }

    #[test]
    fn member_can_switch_persona() {
        let mut member = Member {
            id: MemberId(7),
            nickname: "lunch-runner".to_string(),
            recommendation_type: RecommendationType::Balanced,
        };
        member.change_recommendation_type(RecommendationType::Saver);
        assert_eq!(member.recommendation_type, RecommendationType::Saver);
    }
}
