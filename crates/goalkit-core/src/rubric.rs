use crate::checklist::{Category, CheckContext, CheckOutcome, ChecklistItem};
use crate::document::{find_placeholders, Document, Section};
use crate::types::ArtifactKind;
use regex::Regex;
use std::sync::OnceLock;

pub const BASED_ON: &str = "Based on";

// ---------------------------------------------------------------------------
// Helper macro for concise item definitions
// ---------------------------------------------------------------------------

macro_rules! item {
    (
        id: $id:expr,
        category: $cat:expr,
        description: $desc:expr,
        check: $check:expr
        $(, fix: $fix:expr)?
    ) => {
        ChecklistItem {
            id: $id,
            category: $cat,
            description: $desc,
            check: $check,
            fix: {
                #[allow(unused_assignments, unused_mut)]
                let mut v: Option<fn(&mut Document, &CheckContext) -> bool> = None;
                $(v = Some($fix);)?
                v
            },
        }
    };
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

static TECH_RE: OnceLock<Regex> = OnceLock::new();
static MILESTONE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn tech_re() -> &'static Regex {
    TECH_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:react|angular|vue|django|rails|flask|spring|postgres(?:ql)?|mysql|mongodb|redis|kafka|kubernetes|docker|aws|azure|gcp|graphql|rest api|sql|python|java|javascript|typescript|golang|node\.js|microservices?)\b",
        )
        .unwrap()
    })
}

fn milestone_id_re() -> &'static Regex {
    MILESTONE_ID_RE.get_or_init(|| Regex::new(r"\bM\d+\b").unwrap())
}

/// Short quoted excerpt used as evidence.
fn quote(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let mut excerpt: String = line.chars().take(60).collect();
    if line.chars().count() > 60 {
        excerpt.push_str("...");
    }
    format!("\"{excerpt}\"")
}

fn body<'a>(doc: &'a Document, ctx: &CheckContext, key: &str) -> Option<&'a str> {
    let spec = ctx.template.section(key)?;
    doc.section(spec.heading)
        .map(|s| s.body.as_str())
        .filter(|b| !b.trim().is_empty())
}

fn entry_count(body: &str) -> usize {
    body.lines()
        .map(str::trim_start)
        .filter(|l| l.starts_with("- ") || l.starts_with("* ") || l.starts_with("### "))
        .count()
}

fn template_rank(ctx: &CheckContext, heading: &str) -> usize {
    ctx.template.index_of_heading(heading).unwrap_or(usize::MAX)
}

fn missing_required(doc: &Document, ctx: &CheckContext) -> Vec<&'static str> {
    ctx.template
        .sections
        .iter()
        .filter(|s| s.required)
        .filter(|s| doc.section(s.heading).map(Section::is_blank).unwrap_or(true))
        .map(|s| s.heading)
        .collect()
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

fn required_sections(doc: &Document, ctx: &CheckContext) -> CheckOutcome {
    let missing = missing_required(doc, ctx);
    if missing.is_empty() {
        let present = ctx.template.sections.iter().filter(|s| s.required).count();
        CheckOutcome::pass(format!("all {present} required sections have content"))
    } else {
        CheckOutcome::fail(format!("missing or empty: {}", missing.join(", ")))
    }
}

fn fill_required_sections(doc: &mut Document, ctx: &CheckContext) -> bool {
    let mut changed = false;
    for heading in missing_required(doc, ctx) {
        let Some(default) = ctx
            .template
            .section_by_heading(heading)
            .and_then(|s| s.default.map(|d| s.format_value(d)))
        else {
            continue;
        };
        match doc.section_mut(heading) {
            Some(section) => section.body = default,
            None => {
                let rank = template_rank(ctx, heading);
                let at = doc
                    .sections
                    .iter()
                    .filter(|s| template_rank(ctx, &s.heading) < rank)
                    .count();
                doc.insert_section(at, Section::new(heading, default));
            }
        }
        changed = true;
    }
    changed
}

fn section_order(doc: &Document, ctx: &CheckContext) -> CheckOutcome {
    let known: Vec<(&str, usize)> = doc
        .sections
        .iter()
        .filter_map(|s| {
            ctx.template
                .index_of_heading(&s.heading)
                .map(|i| (s.heading.as_str(), i))
        })
        .collect();
    for pair in known.windows(2) {
        if pair[1].1 < pair[0].1 {
            return CheckOutcome::fail(format!(
                "\"{}\" appears after \"{}\"",
                pair[1].0, pair[0].0
            ));
        }
    }
    CheckOutcome::pass(format!("{} sections in template order", known.len()))
}

fn reorder_sections(doc: &mut Document, ctx: &CheckContext) -> bool {
    let before = doc.headings().join("\n");
    doc.sections
        .sort_by_key(|s| template_rank(ctx, &s.heading));
    doc.headings().join("\n") != before
}

fn no_placeholders(doc: &Document, _ctx: &CheckContext) -> CheckOutcome {
    for section in &doc.sections {
        if let Some(token) = find_placeholders(&section.body).first() {
            return CheckOutcome::fail(format!("\"{token}\" in {}", section.heading));
        }
    }
    if let Some(token) = find_placeholders(&doc.title).first() {
        return CheckOutcome::fail(format!("\"{token}\" in title"));
    }
    CheckOutcome::pass("no N/A, TBD or template slots found")
}

fn replace_placeholders(doc: &mut Document, ctx: &CheckContext) -> bool {
    let mut changed = false;
    let mut drop = Vec::new();
    for section in doc.sections.iter_mut() {
        if find_placeholders(&section.body).is_empty() {
            continue;
        }
        let spec = ctx.template.section_by_heading(&section.heading);
        match spec {
            Some(s) if !s.required => drop.push(section.heading.clone()),
            Some(s) if s.default.is_some() => {
                section.body = s.format_value(s.default.unwrap_or_default());
                changed = true;
            }
            _ => {
                let mut text = section.body.clone();
                for token in find_placeholders(&section.body) {
                    text = text.replace(&token, "");
                }
                section.body = text.trim().to_string();
                changed = true;
            }
        }
    }
    for heading in drop {
        changed |= doc.remove_section(&heading);
    }
    changed
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

fn no_markers(doc: &Document, _ctx: &CheckContext) -> CheckOutcome {
    let markers = doc.markers();
    match markers.first() {
        None => CheckOutcome::pass("no clarification markers remain"),
        Some(first) => CheckOutcome::fail(format!(
            "{} open marker(s), first: \"{first}\"",
            markers.len()
        )),
    }
}

fn cites_predecessor(doc: &Document, ctx: &CheckContext) -> CheckOutcome {
    let cited = doc.metadata_value(BASED_ON);
    match (cited, ctx.predecessor) {
        (Some(c), Some(p)) if c == p => CheckOutcome::pass(format!("**{BASED_ON}**: {c}")),
        (Some(c), None) if !c.is_empty() => CheckOutcome::pass(format!("**{BASED_ON}**: {c}")),
        (Some(c), Some(p)) => CheckOutcome::fail(format!("cites {c}, expected {p}")),
        _ => CheckOutcome::fail(format!("no **{BASED_ON}** line")),
    }
}

fn add_citation(doc: &mut Document, ctx: &CheckContext) -> bool {
    match ctx.predecessor {
        Some(p) => {
            doc.set_metadata(BASED_ON, p);
            true
        }
        None => false,
    }
}

fn current_milestone_named(doc: &Document, ctx: &CheckContext) -> CheckOutcome {
    match body(doc, ctx, "current_milestone") {
        Some(b) if milestone_id_re().is_match(b) => CheckOutcome::pass(quote(b)),
        Some(b) => CheckOutcome::fail(format!("{} names no milestone id like M1", quote(b))),
        None => CheckOutcome::fail("no current milestone"),
    }
}

// ---------------------------------------------------------------------------
// Content quality
// ---------------------------------------------------------------------------

fn no_implementation_details(doc: &Document, _ctx: &CheckContext) -> CheckOutcome {
    for section in &doc.sections {
        if let Some(m) = tech_re().find(&section.body) {
            return CheckOutcome::fail(format!(
                "\"{}\" in {}",
                m.as_str(),
                section.heading
            ));
        }
    }
    CheckOutcome::pass("no technology or framework names")
}

fn strip_implementation_details(doc: &mut Document, ctx: &CheckContext) -> bool {
    let mut changed = false;
    let mut drop = Vec::new();
    for section in doc.sections.iter_mut() {
        if !tech_re().is_match(&section.body) {
            continue;
        }
        let kept: Vec<&str> = section
            .body
            .split_inclusive(['.', '\n'])
            .filter(|sentence| !tech_re().is_match(sentence))
            .collect();
        section.body = kept.concat().trim().to_string();
        changed = true;
        if section.body.is_empty() {
            match ctx.template.section_by_heading(&section.heading) {
                Some(s) if s.default.is_some() => {
                    section.body = s.format_value(s.default.unwrap_or_default());
                }
                Some(s) if !s.required => drop.push(section.heading.clone()),
                _ => {}
            }
        }
    }
    for heading in drop {
        doc.remove_section(&heading);
    }
    changed
}

fn measurable(doc: &Document, ctx: &CheckContext, key: &str) -> CheckOutcome {
    match body(doc, ctx, key) {
        Some(b) if b.chars().any(|c| c.is_ascii_digit()) => CheckOutcome::pass(quote(b)),
        Some(b) => CheckOutcome::fail(format!("{} has no number or percentage", quote(b))),
        None => CheckOutcome::fail("no outcome stated"),
    }
}

fn at_least(doc: &Document, ctx: &CheckContext, key: &str, min: usize, what: &str) -> CheckOutcome {
    let count = body(doc, ctx, key).map(entry_count).unwrap_or(0);
    if count >= min {
        CheckOutcome::pass(format!("{count} {what} listed"))
    } else {
        CheckOutcome::fail(format!("{count} {what} listed, need at least {min}"))
    }
}

// ---------------------------------------------------------------------------
// Item sets
// ---------------------------------------------------------------------------

fn common_items(kind: ArtifactKind) -> Vec<ChecklistItem> {
    let mut items = vec![
        item! {
            id: "C1",
            category: Category::Completeness,
            description: "All required sections are present and filled",
            check: required_sections,
            fix: fill_required_sections
        },
        item! {
            id: "C2",
            category: Category::Completeness,
            description: "Sections follow the template order",
            check: section_order,
            fix: reorder_sections
        },
        item! {
            id: "C3",
            category: Category::Completeness,
            description: "No placeholder tokens remain",
            check: no_placeholders,
            fix: replace_placeholders
        },
        item! {
            id: "R1",
            category: Category::Readiness,
            description: "No unresolved clarification markers",
            check: no_markers
        },
    ];
    if kind.predecessor().is_some() {
        items.push(item! {
            id: "R2",
            category: Category::Readiness,
            description: "Cites the artifact it builds on",
            check: cites_predecessor,
            fix: add_citation
        });
    }
    items
}

/// The full rubric for `kind`: content quality items first, then the common
/// completeness and readiness items.
pub fn items_for(kind: ArtifactKind) -> Vec<ChecklistItem> {
    let mut items = match kind {
        ArtifactKind::Vision => vec![
            item! {
                id: "CQ1",
                category: Category::ContentQuality,
                description: "Free of implementation details",
                check: no_implementation_details,
                fix: strip_implementation_details
            },
            item! {
                id: "CQ2",
                category: Category::ContentQuality,
                description: "Success metrics are measurable",
                check: |doc, ctx| measurable(doc, ctx, "success_metrics")
            },
        ],
        ArtifactKind::Goal => vec![
            item! {
                id: "CQ1",
                category: Category::ContentQuality,
                description: "Free of implementation details",
                check: no_implementation_details,
                fix: strip_implementation_details
            },
            item! {
                id: "CQ2",
                category: Category::ContentQuality,
                description: "Success criteria are measurable",
                check: |doc, ctx| measurable(doc, ctx, "success_criteria")
            },
        ],
        ArtifactKind::Strategies => vec![item! {
            id: "CQ1",
            category: Category::ContentQuality,
            description: "At least two approaches are compared",
            check: |doc, ctx| at_least(doc, ctx, "approaches", 2, "approaches")
        }],
        ArtifactKind::Milestones => vec![item! {
            id: "CQ1",
            category: Category::ContentQuality,
            description: "Plan defines at least two milestones",
            check: |doc, ctx| at_least(doc, ctx, "plan", 2, "milestones")
        }],
        ArtifactKind::Execution => vec![
            item! {
                id: "CQ1",
                category: Category::ContentQuality,
                description: "Tasks are listed",
                check: |doc, ctx| at_least(doc, ctx, "tasks", 1, "tasks")
            },
            item! {
                id: "R3",
                category: Category::Readiness,
                description: "Current milestone is named",
                check: current_milestone_named
            },
        ],
        ArtifactKind::Collaboration => vec![item! {
            id: "CQ1",
            category: Category::ContentQuality,
            description: "Participants are named",
            check: |doc, ctx| at_least(doc, ctx, "participants", 1, "participants")
        }],
        ArtifactKind::Coordination => vec![item! {
            id: "CQ1",
            category: Category::ContentQuality,
            description: "At least two goals are coordinated",
            check: |doc, ctx| at_least(doc, ctx, "goals", 2, "goals")
        }],
    };
    items.extend(common_items(kind));
    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
