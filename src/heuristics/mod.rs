// src/heuristics/mod.rs

pub mod rules;
pub mod tables;

use regex::{Regex, RegexBuilder};
use self::rules::FieldPatternSet;
use tracing::warn;

/// Apply one field pattern to raw bill text.
///
/// Case-insensitive, multi-line; returns the trimmed first capture group.
/// An invalid pattern or no match is `None`, never a panic. Absence of a
/// match is an ordinary outcome, not an error.
pub fn extract_field(text: &str, pattern: &str) -> Option<String> {
    let re = compile(pattern)?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Currency variant: the captured numeric string with a `$` prefix, keeping
/// the bill's own sign notation.
pub fn extract_currency(text: &str, pattern: &str) -> Option<String> {
    extract_field(text, pattern).map(|v| format!("${v}"))
}

fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Unusable field pattern");
            None
        }
    }
}

/// Scalar fields pulled out of bill text by one pattern set.
#[derive(Debug, Clone, Default)]
pub struct PatternFields {
    pub account_number: Option<String>,
    pub billing_period: Option<String>,
    pub total_amount: Option<String>,
    pub due_date: Option<String>,
    pub energy_usage: Option<String>,
    pub generation_charges: Option<String>,
    pub delivery_charges: Option<String>,
    pub nem_credits: Option<String>,
    // Payment block, shared wording across utilities
    pub previous_balance: Option<String>,
    pub payment_received: Option<String>,
    pub current_charges: Option<String>,
}

impl PatternFields {
    /// How many fields were successfully extracted (out of the scalar ones).
    pub fn coverage(&self) -> (usize, usize) {
        let total = 11;
        let filled = [
            self.account_number.is_some(),
            self.billing_period.is_some(),
            self.total_amount.is_some(),
            self.due_date.is_some(),
            self.energy_usage.is_some(),
            self.generation_charges.is_some(),
            self.delivery_charges.is_some(),
            self.nem_credits.is_some(),
            self.previous_balance.is_some(),
            self.payment_received.is_some(),
            self.current_charges.is_some(),
        ]
        .iter()
        .filter(|&&v| v)
        .count();
        (filled, total)
    }
}

/// Run every pattern of a set over the full bill text.
pub fn extract_fields(text: &str, set: &FieldPatternSet) -> PatternFields {
    PatternFields {
        account_number: extract_field(text, set.account_number),
        billing_period: extract_field(text, set.billing_period),
        total_amount: extract_field(text, set.total_amount),
        due_date: extract_field(text, set.due_date),
        energy_usage: extract_field(text, set.energy_usage),
        generation_charges: extract_field(text, set.generation_charges),
        delivery_charges: extract_field(text, set.delivery_charges),
        nem_credits: extract_field(text, set.nem_credits),
        previous_balance: extract_currency(text, rules::PREVIOUS_BALANCE),
        payment_received: extract_currency(text, rules::PAYMENT_RECEIVED),
        current_charges: extract_currency(text, rules::CURRENT_CHARGES),
    }
}

/// Monthly vs annual true-up statement, from key phrases in the bill body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillKind {
    Monthly,
    Annual,
    Unknown,
}

impl BillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillKind::Monthly => "Monthly",
            BillKind::Annual => "Annual",
            BillKind::Unknown => "Unknown",
        }
    }
}

/// Determine whether the bill is a monthly statement or an annual true-up.
pub fn identify_bill_kind(text: &str) -> BillKind {
    if text.contains("Your account will true-up on") || text.contains("Annual Net Usage (kWh)") {
        return BillKind::Annual;
    }
    if text.contains("Total Charges this Month")
        || extract_field(text, r"Billing\s+Period\s+([\w\d,\s-]+)").is_some()
    {
        return BillKind::Monthly;
    }
    BillKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::rules::GENERIC;

    #[test]
    fn extracts_account_number() {
        let text = "Account Number: 123456789";
        assert_eq!(
            extract_field(text, GENERIC.account_number).as_deref(),
            Some("123456789")
        );
    }

    #[test]
    fn extracts_billing_period() {
        let text = "Billing Period: January 1, 2023 to January 31, 2023";
        assert_eq!(
            extract_field(text, GENERIC.billing_period).as_deref(),
            Some("January 1, 2023 to January 31, 2023")
        );
    }

    #[test]
    fn extracts_total_amount_without_currency_symbol() {
        let text = "Total Amount Due: $123.45";
        assert_eq!(
            extract_field(text, GENERIC.total_amount).as_deref(),
            Some("123.45")
        );
    }

    #[test]
    fn no_match_is_none() {
        let text = "This text doesn't contain the pattern";
        assert_eq!(extract_field(text, GENERIC.account_number), None);
        assert_eq!(extract_field("", GENERIC.account_number), None);
    }

    #[test]
    fn invalid_pattern_is_none_not_panic() {
        assert_eq!(extract_field("anything", r"(["), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let text = "ACCOUNT NUMBER: 42-A";
        assert_eq!(
            extract_field(text, GENERIC.account_number).as_deref(),
            Some("42-A")
        );
    }

    #[test]
    fn currency_variant_prefixes_dollar_sign() {
        let text = "Previous Balance $-39.59";
        assert_eq!(
            extract_currency(text, rules::PREVIOUS_BALANCE).as_deref(),
            Some("$-39.59")
        );
        assert_eq!(extract_currency("nothing here", rules::PREVIOUS_BALANCE), None);
    }

    #[test]
    fn field_coverage_counts_filled() {
        let text = "Account Number: 123456789\nTotal Amount Due: $123.45";
        let fields = extract_fields(text, &GENERIC);
        let (filled, total) = fields.coverage();
        assert_eq!(filled, 2);
        assert_eq!(total, 11);
    }

    #[test]
    fn classifies_annual_bill() {
        let text = "Your account will true-up on March 3, 2025.";
        assert_eq!(identify_bill_kind(text), BillKind::Annual);
    }

    #[test]
    fn classifies_monthly_bill() {
        assert_eq!(
            identify_bill_kind("Total Charges this Month $22.57"),
            BillKind::Monthly
        );
        assert_eq!(
            identify_bill_kind("Billing Period July 1 - July 31, 2024"),
            BillKind::Monthly
        );
    }

    #[test]
    fn unclassifiable_bill_is_unknown() {
        assert_eq!(identify_bill_kind("Hello"), BillKind::Unknown);
    }
}
