// persistence-rs/src/seeds.rs
// Built-in safety rules and cultural personas loaded at startup.

use shared_types::{CulturalPersona, PersonaSource, SafetyRule, GENERIC_INDUSTRY, WILDCARD_DEPARTMENT};

pub const SYSTEM_ONBOARDER: &str = "system";

fn system_rule(industry: &str, hr_keywords: &[&str], semantic_rules: &str) -> SafetyRule {
    SafetyRule {
        industry: industry.to_string(),
        department: WILDCARD_DEPARTMENT.to_string(),
        hr_keywords: hr_keywords.iter().map(|k| k.to_string()).collect(),
        semantic_rules: semantic_rules.to_string(),
        is_active: true,
        is_verified: true,
        onboarded_by: SYSTEM_ONBOARDER.to_string(),
    }
}

/// Department-wide rules for the regulated industries plus the generic floor.
pub fn default_rules() -> Vec<SafetyRule> {
    vec![
        system_rule(
            "healthcare",
            &["HIPAA", "patient data", "medical records", "PHI", "PII"],
            "Redact any patient identifiers. Block messages mentioning medical charts or specific treatments.",
        ),
        system_rule(
            "finance",
            &["insider trading", "SEC compliance", "FINRA", "market manipulation"],
            "Block any phrasing that could be interpreted as financial advice or market manipulation.",
        ),
        system_rule(
            "legal",
            &["privileged", "client-attorney", "deposition", "litigation", "case #"],
            "Redact case numbers and specific client names. Ensure no breach of attorney-client privilege in summary.",
        ),
        system_rule(
            GENERIC_INDUSTRY,
            &["Salary", "PIP", "Firing", "Legal Threats"],
            "Enforce standard professional conduct and HR boundaries.",
        ),
    ]
}

const CULTURAL_PROMPTS: &[(&str, &str)] = &[
    ("en", "Standard global professional tone. Clear and direct."),
    ("en-UK", "British professional tone. Use polite understatements, 'please/thank you' frequency, and avoid over-assertiveness."),
    ("ja", "High-context Japanese tone. Prioritize harmony (wa). Use indirect observations and soft suggestions instead of direct demands. Maintain 'Face' (Mianzi/Menboku)."),
    ("de", "Direct German Sachlichkeit. Focus on objective facts, precision, and substantive feedback. Avoid emotional appeals."),
    ("fr", "French Cartesian tone. Value logical rigor, eloquence, and formal structure. Maintain professional distance and intellectual clarity."),
    ("es", "Spanish professional tone. Warm and engaging but maintain professional boundaries. Value personal connection ('Confianza') while enforcing deadlines."),
    ("pt-BR", "Brazilian 'Jeitinho' tone. High-warmth and extremely relationship-focused. Use flexible but firm negotiation. Emphasize that the partnership depends on mutual commitment."),
    ("zh", "Chinese 'Guanxi' tone. Prioritize long-term relationship and communal face. Use respectful, group-alignment language. Be firm on results but soft on the person."),
    ("sv", "Nordic 'Lagom' tone. Collaborative and moderate. Value fairness, consensus, and work-life balance. Expect high individual ownership within the collective goal."),
    ("en-IN", "Indian Professional tone. High-context and respectful. Use formal deferential language ('Sir/Madam' if context suggests) but maintain extreme technical clarity and follow-up persistence."),
    ("en-AF", "African Ubuntu-inspired tone. Emphasize communal responsibility ('I am because we are'). Use warm, community-centric language that encourages mutual support while maintaining firm expectations for the 'village' (the team)."),
];

fn persona_name(code: &str, instruction: &str) -> String {
    if instruction.contains("Japanese") {
        "Japanese (Wa)".to_string()
    } else if instruction.contains("German") {
        "German (Sachlichkeit)".to_string()
    } else if instruction.contains("Brazilian") {
        "Brazilian (Jeitinho)".to_string()
    } else {
        format!("Standard {} Persona", code.to_uppercase())
    }
}

/// Verified personas for every built-in locale.
pub fn system_personas() -> Vec<CulturalPersona> {
    CULTURAL_PROMPTS
        .iter()
        .map(|(code, instruction)| CulturalPersona {
            code: code.to_lowercase(),
            name: persona_name(code, instruction),
            instruction: instruction.to_string(),
            is_verified: true,
            source: PersonaSource::System,
        })
        .collect()
}

/// Instruction for a built-in locale, without touching any store.
pub fn builtin_instruction(code: &str) -> Option<&'static str> {
    CULTURAL_PROMPTS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, instruction)| *instruction)
}
