//! Directory of organizations a user can be referred to, searchable by jurisdiction,
//! category and organization type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Category;

pub const DEFAULT_JURISDICTION: &str = "US";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    LegalAid,
    Court,
    ProBono,
    Government,
    Nonprofit,
    BarAssociation,
    SelfHelp,
}

impl OrganizationType {
    pub const ALL: [OrganizationType; 7] = [
        OrganizationType::LegalAid,
        OrganizationType::Court,
        OrganizationType::ProBono,
        OrganizationType::Government,
        OrganizationType::Nonprofit,
        OrganizationType::BarAssociation,
        OrganizationType::SelfHelp,
    ];

    pub fn description(self) -> &'static str {
        match self {
            OrganizationType::LegalAid => {
                "Legal aid organizations providing free or low-cost legal services"
            }
            OrganizationType::Court => "Court systems and judicial resources",
            OrganizationType::ProBono => "Pro bono attorney networks and volunteer legal services",
            OrganizationType::Government => "Government agencies and public legal resources",
            OrganizationType::Nonprofit => "Nonprofit organizations providing legal assistance",
            OrganizationType::BarAssociation => {
                "Bar associations and professional legal organizations"
            }
            OrganizationType::SelfHelp => "Self-help legal resources and educational materials",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LegalResource {
    pub id: u32,
    pub name: &'static str,
    pub organization_type: OrganizationType,
    pub description: &'static str,
    pub website: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub email: Option<&'static str>,
    pub address: Option<&'static str>,
    pub jurisdiction: &'static str,
    pub categories: &'static [Category],
}

pub static RESOURCES: [LegalResource; 8] = [
    LegalResource {
        id: 1,
        name: "Legal Aid Society",
        organization_type: OrganizationType::LegalAid,
        description: "Provides free legal services to low-income individuals",
        website: Some("https://www.legalaid.org"),
        phone: Some("1-800-LEGAL-AID"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[
            Category::TenantRights,
            Category::FamilyLaw,
            Category::Immigration,
            Category::ConsumerProtection,
        ],
    },
    LegalResource {
        id: 2,
        name: "National Consumer Law Center",
        organization_type: OrganizationType::Nonprofit,
        description: "Consumer advocacy organization providing resources and assistance",
        website: Some("https://www.nclc.org"),
        phone: Some("617-542-8010"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[
            Category::ConsumerProtection,
            Category::DebtCollection,
            Category::Housing,
        ],
    },
    LegalResource {
        id: 3,
        name: "Equal Employment Opportunity Commission",
        organization_type: OrganizationType::Government,
        description: "Federal agency enforcing workplace discrimination laws",
        website: Some("https://www.eeoc.gov"),
        phone: Some("1-800-669-4000"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::Employment, Category::CivilRights],
    },
    LegalResource {
        id: 4,
        name: "National Immigration Law Center",
        organization_type: OrganizationType::Nonprofit,
        description: "Advocacy organization for immigrant rights",
        website: Some("https://www.nilc.org"),
        phone: Some("213-639-3900"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::Immigration],
    },
    LegalResource {
        id: 5,
        name: "National Domestic Violence Hotline",
        organization_type: OrganizationType::Nonprofit,
        description: "24/7 support for domestic violence survivors",
        website: Some("https://www.thehotline.org"),
        phone: Some("1-800-799-7233"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::FamilyLaw, Category::CivilRights],
    },
    LegalResource {
        id: 6,
        name: "American Civil Liberties Union",
        organization_type: OrganizationType::Nonprofit,
        description: "Civil liberties advocacy organization",
        website: Some("https://www.aclu.org"),
        phone: Some("212-549-2500"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::CivilRights, Category::Criminal],
    },
    LegalResource {
        id: 7,
        name: "National Association of Consumer Advocates",
        organization_type: OrganizationType::BarAssociation,
        description: "Organization of attorneys representing consumers",
        website: Some("https://www.consumeradvocates.org"),
        phone: None,
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::ConsumerProtection, Category::DebtCollection],
    },
    LegalResource {
        id: 8,
        name: "HUD Fair Housing Office",
        organization_type: OrganizationType::Government,
        description: "Federal office enforcing fair housing laws",
        website: Some("https://www.hud.gov/fairhousing"),
        phone: Some("1-800-669-9777"),
        email: None,
        address: None,
        jurisdiction: "US",
        categories: &[Category::Housing, Category::CivilRights],
    },
];

pub fn find(id: u32) -> Option<&'static LegalResource> {
    RESOURCES.iter().find(|r| r.id == id)
}

/// Resources in `jurisdiction` (case-insensitive) serving any of `categories`, in id order.
///
/// An empty category list matches every category. `organization_type` narrows the result
/// to one kind of organization.
pub fn resources_for(
    categories: &[Category],
    jurisdiction: &str,
    organization_type: Option<OrganizationType>,
) -> Vec<&'static LegalResource> {
    let jurisdiction = jurisdiction.trim();
    RESOURCES
        .iter()
        .filter(|r| r.jurisdiction.eq_ignore_ascii_case(jurisdiction))
        .filter(|r| organization_type.is_none_or(|t| r.organization_type == t))
        .filter(|r| categories.is_empty() || categories.iter().any(|c| r.categories.contains(c)))
        .collect()
}
