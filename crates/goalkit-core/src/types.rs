use crate::error::GoalkitError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Vision,
    Goal,
    Strategies,
    Milestones,
    Execution,
    Collaboration,
    Coordination,
}

/// Where an artifact lives: once per project, or once per goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactScope {
    Project,
    Goal,
}

impl ArtifactKind {
    pub fn all() -> &'static [ArtifactKind] {
        &[
            ArtifactKind::Vision,
            ArtifactKind::Goal,
            ArtifactKind::Strategies,
            ArtifactKind::Milestones,
            ArtifactKind::Execution,
            ArtifactKind::Collaboration,
            ArtifactKind::Coordination,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Vision => "vision",
            ArtifactKind::Goal => "goal",
            ArtifactKind::Strategies => "strategies",
            ArtifactKind::Milestones => "milestones",
            ArtifactKind::Execution => "execution",
            ArtifactKind::Collaboration => "collaboration",
            ArtifactKind::Coordination => "coordination",
        }
    }

    /// The slash-command suffix that creates this artifact (`/goalkit.<command>`).
    pub fn command(self) -> &'static str {
        match self {
            ArtifactKind::Vision => "vision",
            ArtifactKind::Goal => "goal",
            ArtifactKind::Strategies => "strategies",
            ArtifactKind::Milestones => "milestones",
            ArtifactKind::Execution => "execute",
            ArtifactKind::Collaboration => "collaborate",
            ArtifactKind::Coordination => "coordinate",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            ArtifactKind::Vision => "vision.md",
            ArtifactKind::Goal => "goal.md",
            ArtifactKind::Strategies => "strategies.md",
            ArtifactKind::Milestones => "milestones.md",
            ArtifactKind::Execution => "execution.md",
            ArtifactKind::Collaboration => "collaboration.md",
            ArtifactKind::Coordination => "coordination.md",
        }
    }

    /// Key used for this artifact's path in scaffold JSON, e.g. `GOAL_FILE`.
    pub fn file_key(self) -> String {
        format!("{}_FILE", self.as_str().to_uppercase())
    }

    pub fn scope(self) -> ArtifactScope {
        match self {
            ArtifactKind::Vision | ArtifactKind::Coordination => ArtifactScope::Project,
            _ => ArtifactScope::Goal,
        }
    }

    /// The artifact this one cites and requires to be finalized first.
    pub fn predecessor(self) -> Option<ArtifactKind> {
        match self {
            ArtifactKind::Vision => None,
            ArtifactKind::Goal => Some(ArtifactKind::Vision),
            ArtifactKind::Strategies => Some(ArtifactKind::Goal),
            ArtifactKind::Milestones => Some(ArtifactKind::Strategies),
            ArtifactKind::Execution => Some(ArtifactKind::Milestones),
            ArtifactKind::Collaboration => Some(ArtifactKind::Goal),
            ArtifactKind::Coordination => Some(ArtifactKind::Vision),
        }
    }

    /// The next step of the main chain, suggested once this artifact is final.
    pub fn successor(self) -> Option<ArtifactKind> {
        match self {
            ArtifactKind::Vision => Some(ArtifactKind::Goal),
            ArtifactKind::Goal => Some(ArtifactKind::Strategies),
            ArtifactKind::Strategies => Some(ArtifactKind::Milestones),
            ArtifactKind::Milestones => Some(ArtifactKind::Execution),
            ArtifactKind::Execution | ArtifactKind::Collaboration | ArtifactKind::Coordination => {
                None
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = GoalkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vision" => Ok(ArtifactKind::Vision),
            "goal" => Ok(ArtifactKind::Goal),
            "strategies" | "strategy" => Ok(ArtifactKind::Strategies),
            "milestones" | "milestone" => Ok(ArtifactKind::Milestones),
            "execution" | "execute" => Ok(ArtifactKind::Execution),
            "collaboration" | "collaborate" => Ok(ArtifactKind::Collaboration),
            "coordination" | "coordinate" | "cross-goal-coordination" => {
                Ok(ArtifactKind::Coordination)
            }
            _ => Err(GoalkitError::UnknownKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// LoopState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Drafting,
    Validating,
    ClarificationPending,
    Correcting,
    Ready,
    ReadyWithWarnings,
}

impl LoopState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopState::Drafting => "drafting",
            LoopState::Validating => "validating",
            LoopState::ClarificationPending => "clarification_pending",
            LoopState::Correcting => "correcting",
            LoopState::Ready => "ready",
            LoopState::ReadyWithWarnings => "ready_with_warnings",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Ready | LoopState::ReadyWithWarnings)
    }

    pub fn can_transition_to(self, target: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, target),
            (Drafting, Validating)
                | (Validating, ClarificationPending)
                | (Validating, Correcting)
                | (Validating, Ready)
                | (ClarificationPending, Drafting)
                | (Correcting, Validating)
                | (Correcting, ReadyWithWarnings)
        )
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Impact
// ---------------------------------------------------------------------------

/// How much an unresolved ambiguity matters. Declaration order is priority
/// order: `Scope` outranks `Experience`, which outranks `Implementation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Scope,
    Experience,
    Implementation,
}

impl Impact {
    /// Material ambiguities may be escalated to the user; the rest are defaulted.
    pub fn is_material(self) -> bool {
        matches!(self, Impact::Scope | Impact::Experience)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Scope => "scope",
            Impact::Experience => "experience",
            Impact::Implementation => "implementation",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_parses_command_aliases() {
        for kind in ArtifactKind::all() {
            assert_eq!(ArtifactKind::from_str(kind.as_str()).unwrap(), *kind);
            assert_eq!(ArtifactKind::from_str(kind.command()).unwrap(), *kind);
        }
        assert!(ArtifactKind::from_str("roadmap").is_err());
    }

    #[test]
    fn chain_is_linear_from_vision() {
        let mut kind = ArtifactKind::Execution;
        let mut chain = vec![kind];
        while let Some(prev) = kind.predecessor() {
            chain.push(prev);
            kind = prev;
        }
        assert_eq!(
            chain,
            vec![
                ArtifactKind::Execution,
                ArtifactKind::Milestones,
                ArtifactKind::Strategies,
                ArtifactKind::Goal,
                ArtifactKind::Vision,
            ]
        );
    }

    #[test]
    fn successor_inverts_main_chain() {
        for kind in [
            ArtifactKind::Vision,
            ArtifactKind::Goal,
            ArtifactKind::Strategies,
            ArtifactKind::Milestones,
        ] {
            let next = kind.successor().unwrap();
            assert_eq!(next.predecessor(), Some(kind));
        }
    }

    #[test]
    fn loop_transitions() {
        use LoopState::*;
        assert!(Drafting.can_transition_to(Validating));
        assert!(Validating.can_transition_to(ClarificationPending));
        assert!(ClarificationPending.can_transition_to(Drafting));
        assert!(Correcting.can_transition_to(ReadyWithWarnings));
        assert!(!Drafting.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Drafting));
        assert!(!ClarificationPending.can_transition_to(Validating));
    }

    #[test]
    fn impact_priority_order() {
        assert!(Impact::Scope < Impact::Experience);
        assert!(Impact::Experience < Impact::Implementation);
        assert!(!Impact::Implementation.is_material());
    }

    #[test]
    fn file_keys() {
        assert_eq!(ArtifactKind::Goal.file_key(), "GOAL_FILE");
        assert_eq!(ArtifactKind::Milestones.file_key(), "MILESTONES_FILE");
    }
}
