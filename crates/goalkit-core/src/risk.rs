use crate::error::GoalkitError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

/// What a milestone owner does at a given risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskResponse {
    pub level: RiskLevel,
    pub review_cadence: &'static str,
    pub escalate: bool,
    pub pause_new_work: bool,
    /// Emit a `high_risk` webhook event.
    pub notify: bool,
    pub guidance: &'static str,
}

const RESPONSES: [RiskResponse; 4] = [
    RiskResponse {
        level: RiskLevel::Low,
        review_cadence: "at milestone boundaries",
        escalate: false,
        pause_new_work: false,
        notify: false,
        guidance: "Continue as planned and note the risk in the next review.",
    },
    RiskResponse {
        level: RiskLevel::Medium,
        review_cadence: "weekly",
        escalate: false,
        pause_new_work: false,
        notify: false,
        guidance: "Add a mitigation task and watch the milestone indicator weekly.",
    },
    RiskResponse {
        level: RiskLevel::High,
        review_cadence: "twice weekly",
        escalate: true,
        pause_new_work: false,
        notify: true,
        guidance: "Escalate to the goal owner and revisit the strategy before adding scope.",
    },
    RiskResponse {
        level: RiskLevel::Critical,
        review_cadence: "daily",
        escalate: true,
        pause_new_work: true,
        notify: true,
        guidance: "Stop starting new work, escalate immediately and re-plan the milestone.",
    },
];

impl RiskLevel {
    pub fn all() -> &'static [RiskLevel] {
        &[
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn response(self) -> &'static RiskResponse {
        &RESPONSES[self as usize]
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = GoalkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" | "med" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(GoalkitError::InvalidRiskLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_levels() {
        for level in RiskLevel::all() {
            assert_eq!(level.response().level, *level);
        }
    }

    #[test]
    fn only_high_and_critical_notify() {
        let notifying: Vec<_> = RiskLevel::all()
            .iter()
            .filter(|l| l.response().notify)
            .copied()
            .collect();
        assert_eq!(notifying, vec![RiskLevel::High, RiskLevel::Critical]);
        assert!(RiskLevel::Critical.response().pause_new_work);
        assert!(!RiskLevel::High.response().pause_new_work);
    }

    #[test]
    fn parse_levels() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("severe".parse::<RiskLevel>().is_err());
    }
}
