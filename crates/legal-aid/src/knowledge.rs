//! Static per-category guidance: suggested actions, candidate templates and background.

use schemars::JsonSchema;
use serde::Serialize;

use crate::model::{Category, TemplateSummary};
use crate::templates;

const DEFAULT_ACTIONS: [&str; 5] = [
    "Gather all relevant documentation",
    "Contact local legal aid organizations",
    "Consult with a qualified attorney",
    "Research your rights and options",
    "Consider alternative dispute resolution",
];

/// Five suggested first steps for a category.
pub fn actions_for(category: Category) -> [&'static str; 5] {
    match category {
        Category::TenantRights => [
            "Document all communications with your landlord",
            "Take photos of any housing condition issues",
            "Review your lease agreement carefully",
            "Contact your local tenant rights organization",
            "Check if your area has rent control or tenant protection laws",
        ],
        Category::ConsumerProtection => [
            "Gather all documentation related to the transaction",
            "Contact the business to attempt resolution",
            "File a complaint with your state's consumer protection agency",
            "Consider disputing charges with your credit card company",
            "Report scams to the Federal Trade Commission (FTC)",
        ],
        Category::Employment => [
            "Document all incidents with dates and witnesses",
            "Review your employee handbook and contract",
            "File a complaint with HR if appropriate",
            "Contact the Equal Employment Opportunity Commission (EEOC)",
            "Consult with an employment attorney",
        ],
        Category::FamilyLaw => [
            "Gather important documents (marriage certificate, financial records)",
            "Consider mediation before litigation",
            "Prioritize the best interests of any children involved",
            "Consult with a family law attorney",
            "Look into local family court self-help resources",
        ],
        Category::Immigration => [
            "Gather all immigration documents and records",
            "Do not sign anything without understanding it fully",
            "Contact a qualified immigration attorney immediately",
            "Reach out to local immigrant rights organizations",
            "Know your rights if contacted by immigration enforcement",
        ],
        Category::Criminal => [
            "Exercise your right to remain silent",
            "Request an attorney immediately",
            "Do not discuss your case with anyone except your lawyer",
            "Gather character references and documentation",
            "Contact a public defender if you cannot afford an attorney",
        ],
        Category::CivilRights => [
            "Document the discriminatory incident thoroughly",
            "File a complaint with the appropriate civil rights agency",
            "Gather witness statements and evidence",
            "Contact civil rights organizations for support",
            "Consider consulting with a civil rights attorney",
        ],
        Category::DebtCollection => [
            "Request debt validation in writing",
            "Know your rights under the Fair Debt Collection Practices Act",
            "Keep detailed records of all communications",
            "Consider debt consolidation or payment plans",
            "Consult with a bankruptcy attorney if overwhelmed",
        ],
        Category::Housing => [
            "Document any discriminatory treatment",
            "File a complaint with HUD or local fair housing agency",
            "Know your rights under the Fair Housing Act",
            "Seek assistance from local housing advocacy groups",
            "Consider consulting with a housing attorney",
        ],
        Category::Healthcare => [
            "Request itemized bills and medical records",
            "Appeal insurance denials in writing",
            "Contact your state's insurance commissioner",
            "Seek assistance from patient advocacy organizations",
            "Consider consulting with a healthcare attorney",
        ],
        Category::Other => DEFAULT_ACTIONS,
    }
}

/// Catalog templates for the category in id order, or the general notice when it has none.
pub fn templates_for(category: Category) -> Vec<TemplateSummary> {
    let matching: Vec<TemplateSummary> = templates::for_category(category)
        .map(|t| t.summary())
        .collect();
    if !matching.is_empty() {
        return matching;
    }
    templates::find(templates::GENERAL_NOTICE_ID)
        .map(|t| vec![t.summary()])
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategoryGuidance {
    pub description: &'static str,
    pub key_laws: &'static [&'static str],
    pub common_issues: &'static [&'static str],
    pub urgency_factors: &'static [&'static str],
}

pub fn guidance_for(category: Category) -> Option<CategoryGuidance> {
    let guidance = match category {
        Category::TenantRights => CategoryGuidance {
            description: "Landlord-tenant disputes, evictions, housing conditions",
            key_laws: &["Fair Housing Act", "State Landlord-Tenant Laws", "Local Housing Codes"],
            common_issues: &[
                "Eviction notices",
                "Security deposit disputes",
                "Habitability issues",
                "Rent increases",
            ],
            urgency_factors: &["Eviction timeline", "Health and safety issues", "Illegal lockouts"],
        },
        Category::ConsumerProtection => CategoryGuidance {
            description: "Fraud, scams, unfair business practices",
            key_laws: &[
                "Fair Credit Reporting Act",
                "Truth in Lending Act",
                "State Consumer Protection Laws",
            ],
            common_issues: &[
                "Defective products",
                "Billing disputes",
                "Warranty issues",
                "Fraudulent charges",
            ],
            urgency_factors: &[
                "Time limits for disputes",
                "Ongoing financial harm",
                "Identity theft",
            ],
        },
        Category::Employment => CategoryGuidance {
            description: "Workplace issues, discrimination, wage disputes",
            key_laws: &[
                "Title VII",
                "Americans with Disabilities Act",
                "Fair Labor Standards Act",
                "Family and Medical Leave Act",
            ],
            common_issues: &["Discrimination", "Harassment", "Wrongful termination", "Wage theft"],
            urgency_factors: &["Filing deadlines", "Ongoing harassment", "Financial hardship"],
        },
        Category::FamilyLaw => CategoryGuidance {
            description: "Divorce, custody, domestic relations",
            key_laws: &[
                "State Family Codes",
                "Uniform Child Custody Jurisdiction Act",
                "Violence Against Women Act",
            ],
            common_issues: &[
                "Divorce proceedings",
                "Child custody",
                "Domestic violence",
                "Child support",
            ],
            urgency_factors: &["Safety concerns", "Child welfare", "Court deadlines"],
        },
        Category::Immigration => CategoryGuidance {
            description: "Immigration status, deportation, asylum",
            key_laws: &["Immigration and Nationality Act", "Asylum laws", "DACA regulations"],
            common_issues: &[
                "Deportation proceedings",
                "Asylum claims",
                "Family reunification",
                "Work authorization",
            ],
            urgency_factors: &["Deportation timeline", "Asylum deadlines", "Detention issues"],
        },
        Category::Criminal => CategoryGuidance {
            description: "Criminal defense, expungement, rights",
            key_laws: &["Constitutional rights", "State criminal codes", "Sentencing guidelines"],
            common_issues: &[
                "Criminal charges",
                "Bail hearings",
                "Plea negotiations",
                "Expungement",
            ],
            urgency_factors: &["Court dates", "Custody issues", "Statute of limitations"],
        },
        Category::CivilRights => CategoryGuidance {
            description: "Discrimination, civil liberties violations",
            key_laws: &[
                "Civil Rights Act",
                "Americans with Disabilities Act",
                "Constitutional amendments",
            ],
            common_issues: &["Discrimination", "Police misconduct", "Voting rights", "Accessibility"],
            urgency_factors: &["Filing deadlines", "Ongoing violations", "Evidence preservation"],
        },
        Category::DebtCollection => CategoryGuidance {
            description: "Debt disputes, bankruptcy, creditor harassment",
            key_laws: &[
                "Fair Debt Collection Practices Act",
                "Fair Credit Reporting Act",
                "Bankruptcy Code",
            ],
            common_issues: &["Debt validation", "Harassment", "Wage garnishment", "Bankruptcy"],
            urgency_factors: &[
                "Garnishment proceedings",
                "Foreclosure timeline",
                "Bankruptcy deadlines",
            ],
        },
        Category::Housing => CategoryGuidance {
            description: "Housing discrimination, accessibility, public housing",
            key_laws: &[
                "Fair Housing Act",
                "Americans with Disabilities Act",
                "Section 8 regulations",
            ],
            common_issues: &[
                "Housing discrimination",
                "Accessibility modifications",
                "Public housing issues",
            ],
            urgency_factors: &["Eviction proceedings", "Safety issues", "Discrimination timeline"],
        },
        Category::Healthcare => CategoryGuidance {
            description: "Medical bills, insurance disputes, patient rights",
            key_laws: &[
                "HIPAA",
                "Affordable Care Act",
                "Emergency Medical Treatment and Labor Act",
            ],
            common_issues: &[
                "Insurance denials",
                "Medical billing",
                "Patient rights",
                "Privacy violations",
            ],
            urgency_factors: &["Treatment needs", "Appeal deadlines", "Financial hardship"],
        },
        Category::Other => return None,
    };
    Some(guidance)
}

/// One-line scope of a category, for listings.
pub fn describe(category: Category) -> &'static str {
    guidance_for(category)
        .map(|g| g.description)
        .unwrap_or("Issues that do not fit any other category")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_actions_start_with_documenting_communications() {
        let actions = actions_for(Category::TenantRights);
        assert_eq!(actions[0], "Document all communications with your landlord");
        assert_eq!(
            actions[4],
            "Check if your area has rent control or tenant protection laws"
        );
    }

    #[test]
    fn other_gets_the_default_actions() {
        assert_eq!(actions_for(Category::Other), DEFAULT_ACTIONS);
    }

    #[test]
    fn every_category_has_distinct_actions() {
        for category in Category::ALL {
            let actions = actions_for(category);
            for (i, a) in actions.iter().enumerate() {
                assert!(!a.is_empty());
                assert!(!actions[i + 1..].contains(a), "{category}: duplicate action {a}");
            }
        }
    }

    #[test]
    fn tenant_templates_are_listed_in_id_order() {
        let ids: Vec<u32> = templates_for(Category::TenantRights).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 6]);
    }

    #[test]
    fn categories_without_templates_get_the_general_notice() {
        for category in [Category::Immigration, Category::FamilyLaw, Category::Other] {
            let templates = templates_for(category);
            assert_eq!(templates.len(), 1);
            assert_eq!(templates[0].id, templates::GENERAL_NOTICE_ID);
            assert_eq!(templates[0].name, "General Legal Notice");
        }
    }

    #[test]
    fn every_category_is_described() {
        assert_eq!(
            describe(Category::TenantRights),
            "Landlord-tenant disputes, evictions, housing conditions"
        );
        assert_eq!(describe(Category::Other), "Issues that do not fit any other category");
    }

    #[test]
    fn guidance_exists_for_every_named_category() {
        for category in Category::ALL {
            match guidance_for(category) {
                Some(g) => {
                    assert!(!g.description.is_empty());
                    assert!(!g.key_laws.is_empty());
                }
                None => assert_eq!(category, Category::Other),
            }
        }
        assert!(guidance_for(Category::DebtCollection)
            .unwrap()
            .key_laws
            .contains(&"Fair Debt Collection Practices Act"));
    }
}
