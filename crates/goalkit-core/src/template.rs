//! Fixed-section templates for every artifact kind.
//!
//! Every required section is fillable without user input: it is either the
//! primary section (fed by the raw intake), has a default, or carries a
//! clarification spec whose first option is the recommended answer.

use crate::clarify::{ClarificationQuestion, ResolvedValue};
use crate::document::{marker, Document, Section};
use crate::types::{ArtifactKind, Impact};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Spec types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub answer: &'static str,
    pub implications: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ClarifySpec {
    pub topic: &'static str,
    pub question: &'static str,
    pub impact: Impact,
    /// Three or four options; the first is the recommended default.
    pub options: &'static [OptionSpec],
}

impl ClarifySpec {
    pub fn recommended(&self) -> &'static str {
        self.options.first().map(|o| o.answer).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFormat {
    Prose,
    /// `;`-separated input rendered as a bullet list.
    List,
    /// `;`-separated input rendered as `### M<n>: <title>` entries.
    Milestones,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub key: &'static str,
    pub heading: &'static str,
    pub required: bool,
    pub primary: bool,
    pub aliases: &'static [&'static str],
    /// Regex cues run against free-text intake. Capture group 1 wins when present.
    pub cues: &'static [&'static str],
    pub default: Option<&'static str>,
    pub clarify: Option<ClarifySpec>,
    pub format: SectionFormat,
}

impl SectionSpec {
    /// True if `label` names this section by key, heading or alias.
    pub fn answers_to(&self, label: &str) -> bool {
        let label = label.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        self.key.replace('_', " ") == label
            || self.heading.eq_ignore_ascii_case(&label)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(&label))
    }

    pub fn format_value(&self, text: &str) -> String {
        let text = text.trim();
        match self.format {
            SectionFormat::Prose => text.to_string(),
            SectionFormat::List => {
                if text.lines().any(|l| l.trim_start().starts_with("- ")) {
                    return text.to_string();
                }
                split_items(text)
                    .iter()
                    .map(|item| format!("- {item}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            SectionFormat::Milestones => {
                if text.contains("### ") {
                    return text.to_string();
                }
                split_items(text)
                    .iter()
                    .enumerate()
                    .map(|(i, item)| milestone_entry(i + 1, item))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
    }
}

fn split_items(text: &str) -> Vec<String> {
    text.split([';', '\n'])
        .map(|s| s.trim().trim_start_matches("- ").trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Beta (due 2026-12-01)` → `### M2: Beta` followed by a `**Due**` line.
fn milestone_entry(n: usize, item: &str) -> String {
    let lower = item.to_ascii_lowercase();
    if let Some(start) = lower.find("(due ") {
        let title = item[..start].trim();
        let due = item[start + 5..].trim_end_matches(')').trim();
        return format!("### M{n}: {title}\n\n**Due**: {due}");
    }
    format!("### M{n}: {item}")
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Template {
    pub kind: ArtifactKind,
    pub title: &'static str,
    pub sections: &'static [SectionSpec],
}

impl Template {
    pub fn for_kind(kind: ArtifactKind) -> &'static Template {
        match kind {
            ArtifactKind::Vision => &VISION,
            ArtifactKind::Goal => &GOAL,
            ArtifactKind::Strategies => &STRATEGIES,
            ArtifactKind::Milestones => &MILESTONES,
            ArtifactKind::Execution => &EXECUTION,
            ArtifactKind::Collaboration => &COLLABORATION,
            ArtifactKind::Coordination => &COORDINATION,
        }
    }

    pub fn section(&self, key: &str) -> Option<&'static SectionSpec> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn section_by_heading(&self, heading: &str) -> Option<&'static SectionSpec> {
        self.sections
            .iter()
            .find(|s| s.heading.eq_ignore_ascii_case(heading.trim()))
    }

    pub fn primary(&self) -> Option<&'static SectionSpec> {
        self.sections.iter().find(|s| s.primary)
    }

    pub fn index_of_heading(&self, heading: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.heading.eq_ignore_ascii_case(heading.trim()))
    }

    /// Fill the template: resolved values in section order, a marker for each
    /// open question, and nothing at all for removed optional sections.
    pub fn build(
        &self,
        title: &str,
        metadata: &[(String, String)],
        values: &BTreeMap<String, ResolvedValue>,
        questions: &[ClarificationQuestion],
    ) -> Document {
        let mut doc = Document::new(format!("{}: {}", self.title, title));
        doc.metadata = metadata.to_vec();
        for spec in self.sections {
            if let Some(value) = values.get(spec.key) {
                doc.sections
                    .push(Section::new(spec.heading, spec.format_value(&value.text)));
            } else if let Some(q) = questions.iter().find(|q| q.section == spec.key) {
                doc.sections
                    .push(Section::new(spec.heading, marker(&q.question)));
            }
        }
        doc
    }
}

// ---------------------------------------------------------------------------
// Shared cues
// ---------------------------------------------------------------------------

const CUE_FOR_USERS: &str = r"(?i)\bfor\s+((?:[a-z0-9\-]+\s?){1,5}?)(?:\s+(?:who|to|that|by|in|with|within)\b|[,.;]|$)";
pub(crate) const CUE_PERCENT: &str = r"[^.;\n]*\d+(?:\.\d+)?\s*%[^.;\n]*";
const CUE_QUANTITY: &str =
    r"(?i)[^.;\n]*\b\d+\s*(?:users|teams|customers|days|weeks|minutes|hours|percent)\b[^.;\n]*";
const CUE_MEASURED: &str = r"(?i)\b(?:measured by|success means|success is)\s+([^.;\n]+)";
const CUE_RISK: &str = r"(?i)[^.;\n]*\brisks?\b[^.;\n]*";

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

pub static VISION: Template = Template {
    kind: ArtifactKind::Vision,
    title: "Vision",
    sections: &[
        SectionSpec {
            key: "vision_statement",
            heading: "Vision Statement",
            required: true,
            primary: true,
            aliases: &["vision", "statement"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "target_users",
            heading: "Target Users",
            required: true,
            primary: false,
            aliases: &["users", "audience", "who"],
            cues: &[CUE_FOR_USERS],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Target users",
                question: "Who are the primary users?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "Small teams of 2-10 people",
                        implications: "Collaboration is core; administration stays light",
                    },
                    OptionSpec {
                        answer: "Individual professionals managing their own work",
                        implications: "Narrow single-user scope; sharing is deferred",
                    },
                    OptionSpec {
                        answer: "Departments or whole organizations",
                        implications: "Needs roles, permissions and onboarding at scale",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "problem",
            heading: "Problem Statement",
            required: true,
            primary: false,
            aliases: &["problem", "pain"],
            cues: &[
                r"(?i)[^.;\n]*\b(?:problem|struggles?|struggling|pain|frustrat\w*)\b[^.;\n]*",
                r"(?i)\bbecause\s+([^.;\n]+)",
            ],
            default: Some(
                "The target users lack a focused way to reach the outcome described in the vision statement.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "success_metrics",
            heading: "Success Metrics",
            required: true,
            primary: false,
            aliases: &["metrics", "success", "kpis"],
            cues: &[CUE_PERCENT, CUE_MEASURED, CUE_QUANTITY],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Success metrics",
                question: "What measurable outcome defines success?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "70% of active users return weekly after 3 months",
                        implications: "Optimizes for retention; favors habit-forming features",
                    },
                    OptionSpec {
                        answer: "Teams complete 30% more planned work per cycle",
                        implications: "Optimizes for productivity; needs a baseline first",
                    },
                    OptionSpec {
                        answer: "1,000 active teams within 6 months",
                        implications: "Optimizes for growth; favors onboarding and sharing",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "scope",
            heading: "Scope Boundaries",
            required: true,
            primary: false,
            aliases: &["scope", "boundaries", "in scope"],
            cues: &[r"(?i)\b(?:only|focus(?:ed|es)? on|mvp(?: is)?|in scope:?)\s+([^.;\n]+)"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Scope",
                question: "What is in scope for the first release?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "Core workflow only: create, assign and complete work",
                        implications: "Fastest path to learning; integrations wait",
                    },
                    OptionSpec {
                        answer: "Core workflow plus notifications and reminders",
                        implications: "Better engagement for moderate extra effort",
                    },
                    OptionSpec {
                        answer: "Core workflow plus integrations with existing tools",
                        implications: "Higher adoption potential; largest scope",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "experience",
            heading: "Experience Priorities",
            required: false,
            primary: false,
            aliases: &["experience", "ux"],
            cues: &[r"(?i)[^.;\n]*\b(?:simple|simplicity|fast|intuitive|delightful|effortless)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Experience",
                question: "Which experience quality matters most?",
                impact: Impact::Experience,
                options: &[
                    OptionSpec {
                        answer: "Simplicity: new users succeed without guidance",
                        implications: "Fewer features per screen; strong defaults",
                    },
                    OptionSpec {
                        answer: "Speed: every core action completes in seconds",
                        implications: "Keyboard-first flows; aggressive performance budgets",
                    },
                    OptionSpec {
                        answer: "Visibility: everyone sees progress at a glance",
                        implications: "Dashboards and shared views come first",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "principles",
            heading: "Guiding Principles",
            required: true,
            primary: false,
            aliases: &["principles", "values"],
            cues: &[],
            default: Some(
                "Outcomes over outputs; Learn from every milestone; Keep the vision stable and the strategies flexible",
            ),
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "platform",
            heading: "Delivery Platform",
            required: false,
            primary: false,
            aliases: &["platform"],
            cues: &[r"(?i)[^.;\n]*\b(?:web|mobile|desktop|ios|android)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Platform",
                question: "Which platform ships first?",
                impact: Impact::Implementation,
                options: &[
                    OptionSpec {
                        answer: "Web",
                        implications: "Widest reach with one codebase",
                    },
                    OptionSpec {
                        answer: "Mobile",
                        implications: "Best for on-the-go use; app store cycles",
                    },
                    OptionSpec {
                        answer: "Desktop",
                        implications: "Deep OS integration; narrower reach",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
    ],
};

// ---------------------------------------------------------------------------
// Goal
// ---------------------------------------------------------------------------

pub static GOAL: Template = Template {
    kind: ArtifactKind::Goal,
    title: "Goal",
    sections: &[
        SectionSpec {
            key: "goal_statement",
            heading: "Goal Statement",
            required: true,
            primary: true,
            aliases: &["goal", "statement"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "vision_connection",
            heading: "Vision Connection",
            required: true,
            primary: false,
            aliases: &["vision", "alignment"],
            cues: &[],
            default: Some(
                "Advances the project vision by delivering a measurable improvement for its target users.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "success_criteria",
            heading: "Success Criteria",
            required: true,
            primary: false,
            aliases: &["success", "criteria", "metrics"],
            cues: &[CUE_PERCENT, CUE_MEASURED, CUE_QUANTITY],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Success criteria",
                question: "How will we know this goal is achieved?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "At least 60% of target users adopt the outcome within 30 days",
                        implications: "Adoption-led; requires usage tracking",
                    },
                    OptionSpec {
                        answer: "Time spent on the key task drops by 40%",
                        implications: "Efficiency-led; requires a baseline measurement",
                    },
                    OptionSpec {
                        answer: "Satisfaction of 4.5/5 or higher in follow-up surveys",
                        implications: "Perception-led; slower feedback loop",
                    },
                ],
            }),
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "target_users",
            heading: "Target Users",
            required: true,
            primary: false,
            aliases: &["users", "audience"],
            cues: &[CUE_FOR_USERS],
            default: Some("The primary users named in the project vision."),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "hypotheses",
            heading: "Hypotheses",
            required: true,
            primary: false,
            aliases: &["hypotheses", "assumptions"],
            cues: &[r"(?i)\b(?:we believe|hypothesis:?)\s+([^.;\n]+)"],
            default: Some(
                "If users reach the outcome faster, they keep using the product; The main obstacle today is friction, not missing capability",
            ),
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "timeline",
            heading: "Target Timeline",
            required: false,
            primary: false,
            aliases: &["timeline", "deadline", "when"],
            cues: &[
                r"(?i)\b(?:by|within|in)\s+(\d+\s+(?:days?|weeks?|months?|quarters?)|q[1-4](?:\s+\d{4})?|\d{4}-\d{2}-\d{2})",
            ],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Timeline",
                question: "What is the target timeline for this goal?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "6 weeks",
                        implications: "Forces a narrow first slice",
                    },
                    OptionSpec {
                        answer: "One quarter",
                        implications: "Room for two or three milestones",
                    },
                    OptionSpec {
                        answer: "Six months",
                        implications: "Broad scope; needs intermediate checkpoints",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "constraints",
            heading: "Constraints",
            required: false,
            primary: false,
            aliases: &["constraints", "limits"],
            cues: &[r"(?i)[^.;\n]*\b(?:must|cannot|budget|constraint)\b[^.;\n]*"],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "risks",
            heading: "Known Risks",
            required: false,
            primary: false,
            aliases: &["risks"],
            cues: &[CUE_RISK],
            default: None,
            clarify: None,
            format: SectionFormat::List,
        },
    ],
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

pub static STRATEGIES: Template = Template {
    kind: ArtifactKind::Strategies,
    title: "Strategies",
    sections: &[
        SectionSpec {
            key: "strategy_summary",
            heading: "Strategy Summary",
            required: true,
            primary: true,
            aliases: &["summary", "strategy"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "approaches",
            heading: "Candidate Approaches",
            required: true,
            primary: false,
            aliases: &["approaches", "options"],
            cues: &[],
            default: Some(
                "Narrow pilot: ship the smallest slice to a few users and learn fast; Broad launch: release to everyone and iterate on feedback; Concierge: deliver the outcome manually before automating it",
            ),
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "selection_criteria",
            heading: "Selection Criteria",
            required: true,
            primary: false,
            aliases: &["criteria", "selection"],
            cues: &[],
            default: Some(
                "Speed to first evidence; Cost of reversing the decision; Fit with the success criteria of the goal",
            ),
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "validation",
            heading: "Validation Experiments",
            required: true,
            primary: false,
            aliases: &["validation", "experiments"],
            cues: &[r"(?i)[^.;\n]*\b(?:experiment|prototype|validate|a/b test|pilot)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Validation",
                question: "How should the leading approach be validated?",
                impact: Impact::Experience,
                options: &[
                    OptionSpec {
                        answer: "Prototype tested with 5 target users",
                        implications: "Cheap and fast; qualitative evidence only",
                    },
                    OptionSpec {
                        answer: "Limited pilot with one team for 2 weeks",
                        implications: "Real usage data; slower to set up",
                    },
                    OptionSpec {
                        answer: "A/B test against the current workflow",
                        implications: "Strong evidence; needs enough traffic",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "recommendation",
            heading: "Recommended Strategy",
            required: true,
            primary: false,
            aliases: &["recommendation", "choice"],
            cues: &[],
            default: Some(
                "Start with the first candidate approach and re-evaluate after the first validation experiment.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "risks",
            heading: "Strategy Risks",
            required: false,
            primary: false,
            aliases: &["risks"],
            cues: &[CUE_RISK],
            default: None,
            clarify: None,
            format: SectionFormat::List,
        },
    ],
};

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

pub static MILESTONES: Template = Template {
    kind: ArtifactKind::Milestones,
    title: "Milestones",
    sections: &[
        SectionSpec {
            key: "overview",
            heading: "Overview",
            required: true,
            primary: true,
            aliases: &["overview", "summary"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "plan",
            heading: "Milestone Plan",
            required: true,
            primary: false,
            aliases: &["milestones", "plan"],
            cues: &[],
            default: Some(
                "### M1: Foundation\n\n**Success indicator**: 5 pilot users complete the core workflow\n\n### M2: Validation\n\n**Success indicator**: 60% of pilot users return weekly\n\n### M3: Launch\n\n**Success indicator**: 100 active users",
            ),
            clarify: None,
            format: SectionFormat::Milestones,
        },
        SectionSpec {
            key: "measurement",
            heading: "Progress Measurement",
            required: true,
            primary: false,
            aliases: &["measurement", "cadence", "review"],
            cues: &[r"(?i)[^.;\n]*\b(?:daily|weekly|biweekly|monthly)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Measurement cadence",
                question: "How often is milestone progress reviewed?",
                impact: Impact::Experience,
                options: &[
                    OptionSpec {
                        answer: "Weekly review of each milestone indicator",
                        implications: "Fast course correction; small recurring cost",
                    },
                    OptionSpec {
                        answer: "Every two weeks",
                        implications: "Balanced overhead; slower reaction",
                    },
                    OptionSpec {
                        answer: "At each milestone boundary",
                        implications: "Lowest overhead; problems surface late",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "dependencies",
            heading: "Dependencies",
            required: false,
            primary: false,
            aliases: &["dependencies"],
            cues: &[r"(?i)[^.;\n]*\b(?:depends? on|blocked by|requires)\b[^.;\n]*"],
            default: None,
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "risks",
            heading: "Risk Assessment",
            required: false,
            primary: false,
            aliases: &["risks", "risk"],
            cues: &[CUE_RISK],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
    ],
};

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

pub static EXECUTION: Template = Template {
    kind: ArtifactKind::Execution,
    title: "Execution Plan",
    sections: &[
        SectionSpec {
            key: "summary",
            heading: "Execution Summary",
            required: true,
            primary: true,
            aliases: &["summary"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "current_milestone",
            heading: "Current Milestone",
            required: true,
            primary: false,
            aliases: &["milestone", "current"],
            cues: &[r"\b(M\d+)\b"],
            default: Some("M1"),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "tasks",
            heading: "Tasks",
            required: true,
            primary: false,
            aliases: &["tasks", "todo"],
            cues: &[],
            default: Some(
                "Set up measurement for the milestone success indicator; Build the smallest slice that can move the indicator; Review results with the team and record what was learned",
            ),
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "learning",
            heading: "Learning Loop",
            required: true,
            primary: false,
            aliases: &["learning"],
            cues: &[],
            default: Some(
                "After each task, compare the indicator with the milestone target and record what changed.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "adaptation",
            heading: "Adaptation Triggers",
            required: false,
            primary: false,
            aliases: &["adaptation", "triggers"],
            cues: &[r"(?i)[^.;\n]*\b(?:if|when)\b[^.;\n]*\b(?:drops?|fails?|misses?|below)\b[^.;\n]*"],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "tracking",
            heading: "Progress Tracking",
            required: true,
            primary: false,
            aliases: &["tracking", "progress"],
            cues: &[],
            default: Some(
                "Record each finished milestone with 'goalkit progress complete'; registered webhooks announce completions.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
    ],
};

// ---------------------------------------------------------------------------
// Collaboration
// ---------------------------------------------------------------------------

pub static COLLABORATION: Template = Template {
    kind: ArtifactKind::Collaboration,
    title: "Collaboration Plan",
    sections: &[
        SectionSpec {
            key: "overview",
            heading: "Collaboration Overview",
            required: true,
            primary: true,
            aliases: &["overview"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "participants",
            heading: "Participants & Roles",
            required: true,
            primary: false,
            aliases: &["participants", "roles", "team"],
            cues: &[r"(?i)\bwith\s+(?:the\s+)?([^.;\n]+)"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Participants",
                question: "Who participates in this goal?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "A single team owns the goal end to end",
                        implications: "Simple coordination; limited perspectives",
                    },
                    OptionSpec {
                        answer: "Product and engineering share ownership",
                        implications: "Balanced decisions; needs explicit handoffs",
                    },
                    OptionSpec {
                        answer: "Several teams with one coordinating lead",
                        implications: "Broad capacity; highest communication cost",
                    },
                ],
            }),
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "communication",
            heading: "Communication Cadence",
            required: true,
            primary: false,
            aliases: &["communication", "cadence"],
            cues: &[r"(?i)[^.;\n]*\b(?:daily|weekly|standups?|sync)\b[^.;\n]*"],
            default: Some("Weekly written update plus a short sync at each milestone boundary."),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "handoffs",
            heading: "Handoffs",
            required: true,
            primary: false,
            aliases: &["handoffs"],
            cues: &[],
            default: Some(
                "Work moves between participants only with a written summary of context, decisions and open questions.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "decisions",
            heading: "Decision Making",
            required: false,
            primary: false,
            aliases: &["decisions", "decision making"],
            cues: &[r"(?i)[^.;\n]*\b(?:decides?|consensus|approves?)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Decision making",
                question: "How are disagreements resolved?",
                impact: Impact::Experience,
                options: &[
                    OptionSpec {
                        answer: "The goal owner decides after hearing input",
                        implications: "Fast decisions; depends on owner judgment",
                    },
                    OptionSpec {
                        answer: "Consensus among participants",
                        implications: "Strong buy-in; slower decisions",
                    },
                    OptionSpec {
                        answer: "Escalate to the project lead",
                        implications: "Clear tie-breaker; adds a bottleneck",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
    ],
};

// ---------------------------------------------------------------------------
// Cross-goal coordination
// ---------------------------------------------------------------------------

pub static COORDINATION: Template = Template {
    kind: ArtifactKind::Coordination,
    title: "Cross-Goal Coordination",
    sections: &[
        SectionSpec {
            key: "overview",
            heading: "Coordination Overview",
            required: true,
            primary: true,
            aliases: &["overview"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "goals",
            heading: "Goals Involved",
            required: true,
            primary: false,
            aliases: &["goals"],
            cues: &[],
            default: None,
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "dependencies",
            heading: "Cross-Goal Dependencies",
            required: true,
            primary: false,
            aliases: &["dependencies"],
            cues: &[r"(?i)[^.;\n]*\b(?:depends? on|before|after|blocks?)\b[^.;\n]*"],
            default: None,
            clarify: Some(ClarifySpec {
                topic: "Dependencies",
                question: "How do these goals depend on each other?",
                impact: Impact::Scope,
                options: &[
                    OptionSpec {
                        answer: "Independent: goals proceed in parallel",
                        implications: "Maximum throughput; watch for duplicated work",
                    },
                    OptionSpec {
                        answer: "Sequential: the earliest goal reaches its first milestone first",
                        implications: "Less risk; later goals wait",
                    },
                    OptionSpec {
                        answer: "Shared foundation: common work is done once, then goals diverge",
                        implications: "Efficient; the foundation becomes a bottleneck",
                    },
                ],
            }),
            format: SectionFormat::Prose,
        },
        SectionSpec {
            key: "shared_resources",
            heading: "Shared Resources",
            required: false,
            primary: false,
            aliases: &["resources", "shared"],
            cues: &[r"(?i)[^.;\n]*\bshared?\b[^.;\n]*"],
            default: None,
            clarify: None,
            format: SectionFormat::List,
        },
        SectionSpec {
            key: "sequencing",
            heading: "Sequencing",
            required: true,
            primary: false,
            aliases: &["sequencing", "order"],
            cues: &[],
            default: Some(
                "Goals advance milestone by milestone; a goal waits only when a listed dependency blocks it.",
            ),
            clarify: None,
            format: SectionFormat::Prose,
        },
    ],
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_required_section_is_fillable() {
        for kind in ArtifactKind::all() {
            let t = Template::for_kind(*kind);
            assert_eq!(t.kind, *kind);
            assert_eq!(t.sections.iter().filter(|s| s.primary).count(), 1);
            for s in t.sections.iter().filter(|s| s.required && !s.primary) {
                // `goals` on coordination is supplied by the workflow context.
                if *kind == ArtifactKind::Coordination && s.key == "goals" {
                    continue;
                }
                assert!(
                    s.default.is_some() || s.clarify.is_some(),
                    "{kind}/{} has no way to be filled",
                    s.key
                );
            }
        }
    }

    #[test]
    fn clarify_specs_offer_three_or_four_options() {
        for kind in ArtifactKind::all() {
            for s in Template::for_kind(*kind).sections {
                if let Some(c) = &s.clarify {
                    assert!(
                        (3..=4).contains(&c.options.len()),
                        "{kind}/{} has {} options",
                        s.key,
                        c.options.len()
                    );
                }
            }
        }
    }

    #[test]
    fn all_cues_compile() {
        for kind in ArtifactKind::all() {
            for s in Template::for_kind(*kind).sections {
                for cue in s.cues {
                    assert!(regex::Regex::new(cue).is_ok(), "bad cue on {kind}/{}", s.key);
                }
            }
        }
    }

    #[test]
    fn defaults_carry_no_placeholders() {
        for kind in ArtifactKind::all() {
            for s in Template::for_kind(*kind).sections {
                if let Some(d) = s.default {
                    assert!(crate::document::find_placeholders(d).is_empty());
                }
            }
        }
    }

    #[test]
    fn list_format_splits_on_semicolons() {
        let spec = VISION.section("principles").unwrap();
        assert_eq!(spec.format_value("a; b ;c"), "- a\n- b\n- c");
        assert_eq!(spec.format_value("- kept\n- as is"), "- kept\n- as is");
    }

    #[test]
    fn milestone_format_numbers_entries_and_dates() {
        let spec = MILESTONES.section("plan").unwrap();
        assert_eq!(
            spec.format_value("Foundation; Beta (due 2026-12-01)"),
            "### M1: Foundation\n\n### M2: Beta\n\n**Due**: 2026-12-01"
        );
    }

    #[test]
    fn labels_match_key_heading_or_alias() {
        let spec = GOAL.section("success_criteria").unwrap();
        assert!(spec.answers_to("Success Criteria"));
        assert!(spec.answers_to("success_criteria"));
        assert!(spec.answers_to("metrics"));
        assert!(!spec.answers_to("timeline"));
    }
}
