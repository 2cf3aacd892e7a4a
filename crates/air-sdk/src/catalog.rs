//! Built-in reference data
//!
//! Seed opportunities and pipeline shown when no backend data is available,
//! rate-calculator role presets, and the contract/negotiation toolkit.

use crate::models::{Opportunity, PipelineItem};
use air_backend_client::{OpportunityType, PipelineStage};
use chrono::NaiveDate;

/// Role used by the rate calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePreset {
    pub id: &'static str,
    pub label: &'static str,
    pub day_rate: u64,
}

pub const ROLE_PRESETS: [RolePreset; 4] = [
    RolePreset {
        id: "producer",
        label: "Producer",
        day_rate: 700,
    },
    RolePreset {
        id: "editor",
        label: "Audio Editor",
        day_rate: 650,
    },
    RolePreset {
        id: "reporter",
        label: "Reporter",
        day_rate: 600,
    },
    RolePreset {
        id: "sound-designer",
        label: "Sound Designer",
        day_rate: 800,
    },
];

/// Look up a role preset, falling back to the first one
pub fn role_or_default(id: &str) -> RolePreset {
    ROLE_PRESETS
        .iter()
        .copied()
        .find(|r| r.id == id)
        .unwrap_or(ROLE_PRESETS[0])
}

/// Reusable contract clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub purpose: &'static str,
    pub clause: &'static str,
}

/// Talking points for a rate or terms conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationScript {
    pub id: &'static str,
    pub title: &'static str,
    pub script: &'static str,
}

pub const CONTRACT_TEMPLATES: [ContractTemplate; 3] = [
    ContractTemplate {
        id: "kill-fee",
        title: "Kill Fee Clause",
        purpose: "Protect partial pay when a project is canceled after work starts.",
        clause: "If Client cancels after work begins, Client will pay Contractor a kill fee equal to 50% of the remaining contract value, plus payment for all completed work.",
    },
    ContractTemplate {
        id: "late-payment",
        title: "Late Payment Clause",
        purpose: "Set clear expectations for when invoices are due.",
        clause: "Invoices are due within 30 calendar days. Payments received after 30 days include a 1.5% monthly late fee, or the maximum allowed by law.",
    },
    ContractTemplate {
        id: "scope-revisions",
        title: "Scope and Revisions Clause",
        purpose: "Prevent extra unpaid revisions and scope creep.",
        clause: "This agreement includes two revision rounds. Additional revisions or scope changes are billed at Contractor's standard day rate and require written approval.",
    },
];

pub const NEGOTIATION_SCRIPTS: [NegotiationScript; 3] = [
    NegotiationScript {
        id: "rate-floor",
        title: "Rate Floor Response",
        script: "Thanks for the opportunity. For this scope, my minimum rate is $X based on reporting, edit load, and delivery timeline. If budget is fixed, we can adjust scope to match.",
    },
    NegotiationScript {
        id: "payment-terms",
        title: "Payment Terms Follow-Up",
        script: "Before we lock the schedule, can we confirm payment terms in writing? I typically work with Net 30 and include a late-fee clause to keep payment timing predictable.",
    },
    NegotiationScript {
        id: "rights-clarity",
        title: "Rights Clarification",
        script: "Can we clarify rights in the agreement? My standard is limited-use rights tied to this project unless broader rights are licensed separately.",
    },
];

pub fn contract_template(id: &str) -> Option<&'static ContractTemplate> {
    CONTRACT_TEMPLATES.iter().find(|t| t.id == id)
}

pub fn negotiation_script(id: &str) -> Option<&'static NegotiationScript> {
    NEGOTIATION_SCRIPTS.iter().find(|s| s.id == id)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Opportunities shown before (or instead of) the backend listing
pub fn seed_opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity {
            id: "opp-001".into(),
            title: "Audio Producer: Climate Desk".into(),
            org: "Signal Public Media".into(),
            kind: OpportunityType::Job,
            location: "Remote (US)".into(),
            compensation: "$2,200 per episode".into(),
            deadline: date(2026, 3, 5),
            tags: tags(&["Audio", "Editing", "Investigative"]),
            match_reason: "Matches your profile tags: audio editing, field reporting.".into(),
        },
        Opportunity {
            id: "opp-002".into(),
            title: "Short-Run Narrative Grant".into(),
            org: "Horizon Story Fund".into(),
            kind: OpportunityType::Grant,
            location: "US + Canada".into(),
            compensation: "$15,000 grant".into(),
            deadline: date(2026, 3, 18),
            tags: tags(&["Narrative", "Independent", "Series"]),
            match_reason: "High fit due to your documentary and pilot episode history.".into(),
        },
        Opportunity {
            id: "opp-003".into(),
            title: "Open Pitch: Culture and Place".into(),
            org: "National Audio Review".into(),
            kind: OpportunityType::PitchCall,
            location: "Remote".into(),
            compensation: "$1.25 per published word".into(),
            deadline: date(2026, 2, 28),
            tags: tags(&["Pitch", "Culture", "Essay"]),
            match_reason: "Fast-turn pitch aligned with your active beat preferences.".into(),
        },
        Opportunity {
            id: "opp-004".into(),
            title: "Mentored Editing Fellowship".into(),
            org: "AIR Studio Lab".into(),
            kind: OpportunityType::Fellowship,
            location: "Hybrid (NYC)".into(),
            compensation: "$8,000 stipend".into(),
            deadline: date(2026, 3, 12),
            tags: tags(&["Mentorship", "Editing", "Career Growth"]),
            match_reason: "You marked mentorship as a top priority in your profile.".into(),
        },
    ]
}

/// Example pipeline shown to guests
pub fn seed_pipeline() -> Vec<PipelineItem> {
    vec![
        PipelineItem {
            id: "pipe-1".into(),
            title: "Neighborhood Soundwalk Feature".into(),
            client: "Northline Radio".into(),
            due_date: date(2026, 2, 24),
            value: 1800.0,
            stage: PipelineStage::Applied,
        },
        PipelineItem {
            id: "pipe-2".into(),
            title: "Rural Schools Mini-Doc".into(),
            client: "Civic Audio House".into(),
            due_date: date(2026, 3, 2),
            value: 3200.0,
            stage: PipelineStage::Interview,
        },
        PipelineItem {
            id: "pipe-3".into(),
            title: "Election Prep Explainer".into(),
            client: "Public Forum Daily".into(),
            due_date: date(2026, 3, 10),
            value: 2500.0,
            stage: PipelineStage::Booked,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_falls_back_to_producer() {
        assert_eq!(role_or_default("sound-designer").day_rate, 800);
        assert_eq!(role_or_default("juggler").id, "producer");
    }

    #[test]
    fn test_toolkit_lookup() {
        assert_eq!(contract_template("kill-fee").unwrap().title, "Kill Fee Clause");
        assert!(negotiation_script("rights-clarity").is_some());
        assert!(contract_template("nope").is_none());
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let mut ids: Vec<_> = seed_opportunities().into_iter().map(|o| o.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
