//! Built-in document template catalog.
//!
//! Bodies use `{{field}}` placeholders and `#` heading markers understood by the
//! document assembler.

use crate::model::{Category, Template};

pub static TEMPLATES: [Template; 9] = [
    Template {
        id: 1,
        key: "demand_letter",
        name: "Demand Letter for Payment",
        category: Category::DebtCollection,
        description: "General purpose demand letter for payment of debts",
        body: DEMAND_LETTER,
        required_fields: &["recipient_name", "recipient_address", "amount", "deadline"],
    },
    Template {
        id: 2,
        key: "complaint_letter",
        name: "Consumer Complaint Letter",
        category: Category::ConsumerProtection,
        description: "Formal complaint letter to businesses about defective products or services",
        body: COMPLAINT_LETTER,
        required_fields: &["recipient_name", "recipient_address", "complaint_details"],
    },
    Template {
        id: 3,
        key: "tenant_demand",
        name: "Tenant Demand for Repairs",
        category: Category::TenantRights,
        description: "Demand letter for landlord to make necessary repairs",
        body: TENANT_DEMAND,
        required_fields: &["recipient_name", "property_address", "issue_details", "deadline"],
    },
    Template {
        id: 4,
        key: "debt_validation",
        name: "Debt Validation Request",
        category: Category::DebtCollection,
        description: "Request for debt validation from collectors under FDCPA",
        body: DEBT_VALIDATION,
        required_fields: &["recipient_name", "recipient_address", "amount", "account_number"],
    },
    Template {
        id: 5,
        key: "employment_complaint",
        name: "Employment Discrimination Complaint",
        category: Category::Employment,
        description: "Formal complaint about workplace discrimination",
        body: EMPLOYMENT_COMPLAINT,
        required_fields: &["recipient_name", "recipient_address", "incident_details", "witnesses"],
    },
    Template {
        id: 6,
        key: "security_deposit",
        name: "Security Deposit Demand",
        category: Category::TenantRights,
        description: "Letter demanding return of security deposit",
        body: SECURITY_DEPOSIT,
        required_fields: &["recipient_name", "property_address", "deposit_amount", "move_out_date"],
    },
    Template {
        id: 7,
        key: "cease_desist",
        name: "Cease and Desist Letter",
        category: Category::CivilRights,
        description: "Letter to stop harassment or unwanted contact",
        body: CEASE_DESIST,
        required_fields: &["recipient_name", "recipient_address", "harassment_details"],
    },
    Template {
        id: 8,
        key: "insurance_appeal",
        name: "Insurance Claim Appeal",
        category: Category::Healthcare,
        description: "Appeal letter for denied insurance claims",
        body: INSURANCE_APPEAL,
        required_fields: &["recipient_name", "policy_number", "claim_number", "denial_reason"],
    },
    Template {
        id: 9,
        key: "notice_letter",
        name: "General Legal Notice",
        category: Category::Other,
        description: "General purpose legal notice template",
        body: NOTICE_LETTER,
        required_fields: &["recipient_name", "recipient_address"],
    },
];

/// The template used for categories without a dedicated one.
pub const GENERAL_NOTICE_ID: u32 = 9;

pub fn find(id: u32) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn find_by_key(key: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.key.eq_ignore_ascii_case(key.trim()))
}

pub fn for_category(category: Category) -> impl Iterator<Item = &'static Template> {
    TEMPLATES.iter().filter(move |t| t.category == category)
}

const DEMAND_LETTER: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# DEMAND FOR PAYMENT

Dear {{recipient_name}},

This letter serves as formal notice that you owe me the sum of ${{amount}} for {{issue_description}}.

Despite previous attempts to resolve this matter, payment has not been received. This matter is {{urgency}} priority and requires immediate attention.

I hereby demand payment of the full amount of ${{amount}} within {{deadline}} days of receipt of this letter. If payment is not received by this deadline, I will pursue all available legal remedies.

# OPPORTUNITY TO RESOLVE

I prefer to resolve this matter without litigation. If you believe this debt is in error or would like to discuss payment arrangements, please contact me at {{user_email}} or the address above.";

const COMPLAINT_LETTER: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# FORMAL COMPLAINT

Dear {{recipient_name}},

I am writing to formally complain about {{issue_description}}.

# DETAILS OF COMPLAINT

{{complaint_details}}

This situation began on or around {{created_date}} and has caused me significant concern.

# REQUESTED RESOLUTION

Please acknowledge receipt of this complaint within 5 business days and provide a written response with your proposed resolution within 15 business days.

I look forward to your prompt response and resolution of this matter.";

const TENANT_DEMAND: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}} (Landlord)
{{recipient_address}}

# TENANT DEMAND LETTER

Dear {{recipient_name}},

I am your tenant at {{property_address}}. I am writing to formally demand that you address the following issue: {{issue_description}}.

{{issue_details}}

# LANDLORD OBLIGATIONS

As my landlord, you have a legal obligation to maintain the rental property in habitable condition and comply with all applicable housing codes.

# DEMAND FOR ACTION

I hereby demand that you take appropriate action within {{deadline}} days of receipt of this letter.";

const DEBT_VALIDATION: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# DEBT VALIDATION REQUEST

Re: Account Number: {{account_number}}
    Alleged Debt Amount: ${{amount}}

This letter is sent pursuant to the Fair Debt Collection Practices Act, 15 USC 1692g Sec. 809 (b). It is not a refusal to pay.

# VALIDATION REQUEST

I hereby request that you provide validation of this alleged debt. Until you provide proper validation, I dispute the validity of this alleged debt in its entirety and you must cease collection activities.";

const EMPLOYMENT_COMPLAINT: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# EMPLOYMENT DISCRIMINATION COMPLAINT

Dear {{recipient_name}},

I am writing to formally complain about discrimination I have experienced in the workplace.

{{issue_description}}

{{incident_details}}

Witnesses: {{witnesses}}

I request that you investigate this matter thoroughly and take appropriate corrective action.";

const SECURITY_DEPOSIT: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}} (Landlord)
{{recipient_address}}

# DEMAND FOR RETURN OF SECURITY DEPOSIT

Dear {{recipient_name}},

I was your tenant at {{property_address}} until {{move_out_date}}.

I hereby demand the return of my security deposit in the amount of ${{deposit_amount}} within the time period required by law.";

const CEASE_DESIST: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# CEASE AND DESIST NOTICE

Dear {{recipient_name}},

This letter serves as formal notice to CEASE AND DESIST from {{harassment_details}}.

Your actions constitute harassment and must stop immediately. Continued contact will result in legal action.";

const INSURANCE_APPEAL: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# INSURANCE CLAIM APPEAL

Re: Policy Number: {{policy_number}}
    Claim Number: {{claim_number}}

I am formally appealing your denial of my insurance claim.

The denial reason given was: {{denial_reason}}

{{issue_description}}";

const NOTICE_LETTER: &str = "{{sender_name}}
{{sender_address}}

{{current_date}}

{{recipient_name}}
{{recipient_address}}

# LEGAL NOTICE

Dear {{recipient_name}},

Please be advised that this letter serves as formal legal notice regarding {{issue_description}}.

This matter is classified as {{urgency}} priority and requires your immediate attention.

# REQUIRED ACTION

You are hereby notified that you must take appropriate action to address this matter within a reasonable time period. Failure to respond may result in further legal proceedings.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::placeholders;

    const LETTER_HEAD: &str = "{{sender_name}}\n{{sender_address}}\n\n{{current_date}}\n\n";

    #[test]
    fn ids_and_keys_are_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.key, b.key);
            }
        }
        assert_eq!(find(GENERAL_NOTICE_ID).map(|t| t.key), Some("notice_letter"));
    }

    #[test]
    fn every_body_starts_with_the_letter_head() {
        for template in &TEMPLATES {
            assert!(template.body.starts_with(LETTER_HEAD), "{}", template.key);
        }
    }

    #[test]
    fn required_fields_appear_in_the_body() {
        for template in &TEMPLATES {
            let fields = placeholders(template.body);
            for required in template.required_fields {
                assert!(
                    fields.iter().any(|f| f == required),
                    "{} requires {required} but never uses it",
                    template.key
                );
            }
        }
    }

    #[test]
    fn lookup_by_key_ignores_case() {
        assert_eq!(find_by_key(" Tenant_Demand ").map(|t| t.id), Some(3));
        assert!(find_by_key("unknown").is_none());
    }
}
