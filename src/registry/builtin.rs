use super::{MeetingKind, MeetingType, Participant, Team};
use crate::context::ContextKind;

struct Role {
    id: &'static str,
    display_name: &'static str,
    title: &'static str,
    team: Team,
    reports_to: Option<&'static str>,
    description: &'static str,
    responsibilities: &'static [&'static str],
}

const ROLES: &[Role] = &[
    Role {
        id: "ceo",
        display_name: "CEO",
        title: "Chief Executive Officer",
        team: Team::Executive,
        reports_to: None,
        description: "Strategic leadership, vision setting, and overall company direction. Oversees all departments and makes final decisions on major initiatives.",
        responsibilities: &["Company strategy", "Team leadership", "Client relationships", "Business development"],
    },
    Role {
        id: "cfo",
        display_name: "CFO",
        title: "Chief Financial Officer",
        team: Team::Executive,
        reports_to: Some("ceo"),
        description: "Financial planning, budgeting, and fiscal oversight. Manages company finances and ensures financial health.",
        responsibilities: &["Budget management", "Financial reporting", "Cash flow", "Pricing strategy"],
    },
    Role {
        id: "cito",
        display_name: "CITO",
        title: "Chief Information Technology Officer",
        team: Team::Executive,
        reports_to: Some("ceo"),
        description: "Technical strategy and architecture decisions. Leads technology direction and oversees engineering teams.",
        responsibilities: &["Tech strategy", "Architecture decisions", "Technical hiring", "Innovation"],
    },
    Role {
        id: "sales",
        display_name: "Sales",
        title: "Sales Director",
        team: Team::Executive,
        reports_to: Some("ceo"),
        description: "Business development and client acquisition. Manages sales pipeline and negotiates deals.",
        responsibilities: &["Lead generation", "Client pitches", "Deal negotiation", "Pipeline management"],
    },
    Role {
        id: "legal",
        display_name: "Legal",
        title: "Legal Counsel",
        team: Team::Executive,
        reports_to: Some("ceo"),
        description: "Contract review, compliance, and risk management. Protects company interests and ensures legal compliance.",
        responsibilities: &["Contract review", "IP protection", "Compliance", "Risk assessment"],
    },
    Role {
        id: "pm",
        display_name: "PM",
        title: "Project Manager",
        team: Team::Operations,
        reports_to: Some("cito"),
        description: "Project coordination and delivery management. Ensures projects are delivered on time and within scope.",
        responsibilities: &["Project planning", "Resource allocation", "Stakeholder communication", "Risk management"],
    },
    Role {
        id: "dev_lead",
        display_name: "DevLead",
        title: "Development Lead",
        team: Team::Technical,
        reports_to: Some("cito"),
        description: "Engineering team leadership and code quality. Oversees development processes and technical implementation.",
        responsibilities: &["Code reviews", "Technical mentoring", "Sprint planning", "Architecture implementation"],
    },
    Role {
        id: "design_lead",
        display_name: "DesignLead",
        title: "Design Lead",
        team: Team::Technical,
        reports_to: Some("cito"),
        description: "User experience and visual design direction. Creates and maintains design systems and standards.",
        responsibilities: &["UX design", "Design systems", "User research", "Brand consistency"],
    },
    Role {
        id: "qa_lead",
        display_name: "QALead",
        title: "Quality Assurance Lead",
        team: Team::Technical,
        reports_to: Some("cito"),
        description: "Quality standards and testing strategy. Ensures product quality through comprehensive testing.",
        responsibilities: &["Test strategy", "QA processes", "Bug triage", "Release certification"],
    },
    Role {
        id: "customer_success",
        display_name: "CustomerSuccess",
        title: "Customer Success Manager",
        team: Team::Operations,
        reports_to: Some("ceo"),
        description: "Client relationship management post-sale. Ensures client satisfaction and identifies growth opportunities.",
        responsibilities: &["Client onboarding", "Success metrics", "Relationship building", "Upselling"],
    },
    Role {
        id: "marketing",
        display_name: "Marketing",
        title: "Marketing Director",
        team: Team::Operations,
        reports_to: Some("ceo"),
        description: "Brand strategy and marketing campaigns. Drives awareness and generates leads for the sales team.",
        responsibilities: &["Brand strategy", "Content marketing", "ASO/SEO", "Lead generation"],
    },
    Role {
        id: "support",
        display_name: "Support",
        title: "Support Lead",
        team: Team::Operations,
        reports_to: Some("ceo"),
        description: "Customer support and issue resolution. Manages support team and ensures timely issue resolution.",
        responsibilities: &["Support operations", "Issue triage", "Knowledge base", "Escalation management"],
    },
];

const DEFAULT_LINEUP: &[&str] = &[
    "cito",
    "pm",
    "dev_lead",
    "qa_lead",
    "customer_success",
    "marketing",
];

fn persona(role: &Role) -> String {
    let responsibilities = role
        .responsibilities
        .iter()
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are the {} ({}) of the company.\n\n{}\n\n## Responsibilities\n{}\n\n\
         Speak from your role. Be specific, reference real projects where you can, \
         and keep answers focused on what your function owns.",
        role.title, role.display_name, role.description, responsibilities
    )
}

pub fn participants() -> Vec<Participant> {
    ROLES
        .iter()
        .map(|role| Participant {
            id: role.id.to_string(),
            display_name: role.display_name.to_string(),
            title: role.title.to_string(),
            persona: persona(role),
            team: role.team,
            reports_to: role.reports_to.map(str::to_string),
        })
        .collect()
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn meeting_types() -> Vec<MeetingType> {
    use ContextKind::*;

    vec![
        MeetingType {
            id: "standup".to_string(),
            name: "Daily Standup".to_string(),
            kind: MeetingKind::Standup,
            participants: ids(DEFAULT_LINEUP),
            context: vec![Company],
            facilitator: Some("pm".to_string()),
            synthesis: false,
        },
        MeetingType {
            id: "strategy".to_string(),
            name: "Strategy Session".to_string(),
            kind: MeetingKind::Discussion,
            participants: ids(&["cito", "pm", "dev_lead"]),
            context: vec![Company, ActiveProjects],
            facilitator: Some("cito".to_string()),
            synthesis: true,
        },
        MeetingType {
            id: "idea_review".to_string(),
            name: "Idea Review".to_string(),
            kind: MeetingKind::IdeaReview,
            participants: ids(DEFAULT_LINEUP),
            context: vec![Company, ActiveProjects, PendingIdeas],
            facilitator: Some("cito".to_string()),
            synthesis: true,
        },
        MeetingType {
            id: "retro".to_string(),
            name: "Retrospective".to_string(),
            kind: MeetingKind::Retrospective,
            participants: ids(DEFAULT_LINEUP),
            context: vec![Company, ActiveProjects],
            facilitator: Some("pm".to_string()),
            synthesis: true,
        },
        MeetingType {
            id: "custom".to_string(),
            name: "Custom Meeting".to_string(),
            kind: MeetingKind::Discussion,
            participants: ids(&["cito", "pm", "dev_lead"]),
            context: vec![Company],
            facilitator: Some("cito".to_string()),
            synthesis: true,
        },
        MeetingType {
            id: "exec".to_string(),
            name: "Executive Meeting".to_string(),
            kind: MeetingKind::Discussion,
            participants: ids(&["ceo", "cfo", "cito"]),
            context: vec![Company],
            facilitator: Some("ceo".to_string()),
            synthesis: false,
        },
    ]
}
