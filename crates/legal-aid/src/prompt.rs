/// Prompt construction for classification and advice requests.
///
/// Both builders are pure: identical inputs produce byte-identical prompts. They embed the
/// closed category list and the exact JSON shape the response parser expects. The parser
/// still validates everything; the wording here is guidance for the model, not a contract.
use crate::model::Category;

const CATEGORY_DESCRIPTIONS: [(Category, &str); 11] = [
    (
        Category::TenantRights,
        "Landlord-tenant disputes, evictions, housing conditions, rent issues, lease problems, security deposits, repairs, habitability",
    ),
    (
        Category::ConsumerProtection,
        "Fraud, scams, unfair business practices, defective products, billing disputes, warranty issues, identity theft",
    ),
    (
        Category::Employment,
        "Workplace discrimination, harassment, wrongful termination, wage theft, workplace safety, labor violations, FMLA",
    ),
    (
        Category::FamilyLaw,
        "Divorce, child custody, child support, domestic violence, adoption, paternity, marriage, separation",
    ),
    (
        Category::Immigration,
        "Immigration status, deportation, asylum, visas, green cards, citizenship, work permits, family reunification",
    ),
    (
        Category::Criminal,
        "Criminal charges, arrest, bail, plea bargains, expungement, criminal defense, probation, parole",
    ),
    (
        Category::CivilRights,
        "Discrimination based on race/gender/religion/disability, police misconduct, voting rights, accessibility",
    ),
    (
        Category::DebtCollection,
        "Debt disputes, bankruptcy, creditor harassment, wage garnishment, foreclosure, debt validation",
    ),
    (
        Category::Housing,
        "Housing discrimination, fair housing violations, accessibility issues, public housing, Section 8",
    ),
    (
        Category::Healthcare,
        "Medical bills, insurance disputes, patient rights, HIPAA violations, medical malpractice, insurance denials",
    ),
    (
        Category::Other,
        "Only use this if the issue truly doesn't fit any of the above categories",
    ),
];

const CLASSIFICATION_RULES: &str = "\
Classification Guidelines:
- If it involves a landlord and tenant relationship, use \"tenant_rights\"
- If it involves workplace issues, use \"employment\"
- If it involves buying/selling goods or services, use \"consumer_protection\"
- If it involves family relationships, use \"family_law\"
- If it involves immigration status, use \"immigration\"
- If it involves criminal charges, use \"criminal\"
- If it involves discrimination, use \"civil_rights\"
- If it involves debt or money owed, use \"debt_collection\"
- If it involves housing discrimination, use \"housing\"
- If it involves medical/health insurance, use \"healthcare\"
";

const CLASSIFICATION_SCHEMA: &str = r#"{
    "category": "exact_category_name",
    "confidence": 0.85,
    "urgency": "low",
    "complexity": "moderate",
    "reasoning": "Brief explanation of why this category was chosen"
}"#;

const ADVICE_SCHEMA: &str = r#"{
    "advice": "Detailed advice and explanation of the situation",
    "next_steps": ["Step 1", "Step 2", "Step 3"],
    "relevant_laws": ["Law or regulation 1", "Law or regulation 2"],
    "confidence": 0.85,
    "disclaimers": ["This is not legal advice", "Consult with a qualified attorney"]
}"#;

const ADVICE_GUIDANCE: &str = "\
Focus on:
1. Explaining the person's rights and options
2. Providing practical next steps they can take
3. Mentioning relevant laws or regulations
4. Being empathetic and supportive
5. Always including appropriate disclaimers

Remember: This is general information only, not legal advice. The person should consult with a qualified attorney for their specific situation.
";

/// Build the prompt asking the model to classify an issue description.
pub fn classification_prompt(description: &str, location: Option<&str>) -> String {
    let categories: String = CATEGORY_DESCRIPTIONS
        .iter()
        .map(|(category, scope)| format!("- {category}: {scope}\n"))
        .collect();

    format!(
        "You are a legal classification expert. Analyze this legal issue{location} and classify it into the most appropriate category.\n\
         \n\
         Issue description: {description}\n\
         \n\
         IMPORTANT: You must choose from one of these exact categories:\n\
         {categories}\n\
         {CLASSIFICATION_RULES}\n\
         Respond with ONLY a JSON object matching this schema (no additional text, no markdown fences):\n\
         {CLASSIFICATION_SCHEMA}\n\
         \n\
         Urgency levels: low, medium, high\n\
         Complexity levels: simple, moderate, complex\n",
        location = location_suffix(location),
    )
}

/// Build the prompt asking the model for advice on an already categorized issue.
pub fn advice_prompt(
    description: &str,
    category: Category,
    location: Option<&str>,
    additional_context: Option<&str>,
) -> String {
    let context = match additional_context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("\n\nAdditional context: {context}"),
        None => String::new(),
    };
    let categories = CATEGORY_DESCRIPTIONS
        .iter()
        .map(|(c, _)| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a legal aid assistant helping someone with a {category} issue{location}.\n\
         \n\
         Issue description: {description}{context}\n\
         \n\
         Known legal categories: {categories}\n\
         \n\
         Respond with ONLY a JSON object matching this schema (no additional text, no markdown fences):\n\
         {ADVICE_SCHEMA}\n\
         \n\
         {ADVICE_GUIDANCE}",
        location = location_suffix(location),
    )
}

fn location_suffix(location: Option<&str>) -> String {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(l) => format!(" in {l}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_prompt_is_deterministic() {
        let a = classification_prompt("My landlord won't fix the heat", Some("Chicago, IL"));
        let b = classification_prompt("My landlord won't fix the heat", Some("Chicago, IL"));
        assert_eq!(a, b);
    }

    #[test]
    fn classification_prompt_lists_every_category() {
        let prompt = classification_prompt("anything", None);
        for category in Category::ALL {
            assert!(
                prompt.contains(&format!("- {}: ", category.as_str())),
                "missing category {category}"
            );
        }
        assert!(prompt.contains("Respond with ONLY a JSON object"));
        assert!(prompt.contains("\"reasoning\""));
    }

    #[test]
    fn location_is_optional_and_trimmed() {
        let with = classification_prompt("x", Some("  Austin, TX "));
        assert!(with.contains("Analyze this legal issue in Austin, TX and classify"));
        let blank = classification_prompt("x", Some("   "));
        assert!(blank.contains("Analyze this legal issue and classify"));
    }

    #[test]
    fn advice_prompt_embeds_category_and_context() {
        let prompt = advice_prompt(
            "Collector calls me at work",
            Category::DebtCollection,
            None,
            Some("They call five times a day"),
        );
        assert!(prompt.starts_with("You are a legal aid assistant helping someone with a debt_collection issue."));
        assert!(prompt.contains("Additional context: They call five times a day"));
        assert!(prompt.contains("\"next_steps\""));
        assert!(prompt.contains("Known legal categories: tenant_rights, consumer_protection"));
    }

    #[test]
    fn prompts_keep_their_line_layout() {
        let prompt = classification_prompt("Boss withheld my pay", None);
        assert!(prompt.contains(
            "Issue description: Boss withheld my pay\n\nIMPORTANT: You must choose from one of these exact categories:\n- tenant_rights: "
        ));
        assert!(prompt.contains("Only use this if the issue truly doesn't fit any of the above categories\n\nClassification Guidelines:\n"));
        assert!(prompt.ends_with("Urgency levels: low, medium, high\nComplexity levels: simple, moderate, complex\n"));

        let advice = advice_prompt("x", Category::Employment, Some("Denver"), Some("ctx"));
        assert!(advice.contains("employment issue in Denver.\n\nIssue description: x\n\nAdditional context: ctx\n\nKnown legal categories: "));
        assert!(advice.contains("}\n\nFocus on:\n1. "));
        assert!(advice.ends_with("for their specific situation.\n"));
    }

    #[test]
    fn advice_prompt_skips_empty_context() {
        let prompt = advice_prompt("x", Category::Other, None, Some(" "));
        assert!(!prompt.contains("Additional context"));
    }
}
