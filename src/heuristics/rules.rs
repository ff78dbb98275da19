// src/heuristics/rules.rs

/// The utility companies we carry hand-authored pattern sets for. Anything
/// else falls back to the generic set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    Generic,
    /// San Diego Gas & Electric
    Sdge,
    /// Pacific Gas & Electric
    Pge,
    /// Southern California Edison
    Sce,
}

impl Utility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Utility::Generic => "generic",
            Utility::Sdge => "sdge",
            Utility::Pge => "pge",
            Utility::Sce => "sce",
        }
    }
}

/// Signature substrings checked against the lower-cased bill text, in
/// declaration order. The first hit wins.
const SIGNATURES: &[(&[&str], Utility)] = &[
    (&["san diego gas & electric", "sdg&e"], Utility::Sdge),
    (&["pacific gas and electric", "pg&e"], Utility::Pge),
    (&["southern california edison", "sce"], Utility::Sce),
];

/// Classify raw bill text to a utility. Unrecognized text is `Generic`,
/// never an error.
pub fn detect_utility(text: &str) -> Utility {
    let lower = text.to_lowercase();
    for (needles, utility) in SIGNATURES {
        if needles.iter().any(|n| lower.contains(n)) {
            return *utility;
        }
    }
    Utility::Generic
}

/// One regex per scalar field, each with exactly one capture group.
/// Every set carries all eight fields; a missing field is unrepresentable.
#[derive(Debug, Clone, Copy)]
pub struct FieldPatternSet {
    pub account_number: &'static str,
    pub billing_period: &'static str,
    pub total_amount: &'static str,
    pub due_date: &'static str,
    pub energy_usage: &'static str,
    pub generation_charges: &'static str,
    pub delivery_charges: &'static str,
    pub nem_credits: &'static str,
}

impl FieldPatternSet {
    /// The exact set for a known utility; the generic set otherwise.
    /// Static read-only configuration, never mutated at runtime.
    pub fn for_utility(utility: Utility) -> &'static FieldPatternSet {
        match utility {
            Utility::Generic => &GENERIC,
            Utility::Sdge => &SDGE,
            Utility::Pge => &PGE,
            Utility::Sce => &SCE,
        }
    }

    /// All eight patterns in a fixed order, for completeness checks.
    pub fn all(&self) -> [(&'static str, &'static str); 8] {
        [
            ("account_number", self.account_number),
            ("billing_period", self.billing_period),
            ("total_amount", self.total_amount),
            ("due_date", self.due_date),
            ("energy_usage", self.energy_usage),
            ("generation_charges", self.generation_charges),
            ("delivery_charges", self.delivery_charges),
            ("nem_credits", self.nem_credits),
        ]
    }
}

pub static GENERIC: FieldPatternSet = FieldPatternSet {
    account_number: r"Account\s*Number[:\s]*([A-Za-z0-9-]+)",
    billing_period: r"Billing\s*Period[:\s]*([A-Za-z0-9,\s]+to[A-Za-z0-9,\s]+)",
    total_amount: r"Total\s*Amount\s*Due[:\s]*\$?([0-9,.]+)",
    due_date: r"Due\s*Date[:\s]*([A-Za-z0-9,\s]+)",
    energy_usage: r"Total\s*kWh\s*Used[:\s]*([0-9,.]+)",
    generation_charges: r"Generation\s*Charges[:\s]*\$?([0-9,.]+)",
    delivery_charges: r"Delivery\s*Charges[:\s]*\$?([0-9,.]+)",
    nem_credits: r"NEM\s*Credits[:\s]*\$?([0-9,.]+)",
};

static SDGE: FieldPatternSet = FieldPatternSet {
    account_number: r"Account\s*Number[:\s]*([A-Za-z0-9-]+)",
    billing_period: r"Billing\s*period[:\s]*([A-Za-z0-9,\s]+to[A-Za-z0-9,\s]+)",
    total_amount: r"TOTAL\s*AMOUNT\s*DUE[:\s]*\$?([0-9,.]+)",
    due_date: r"Due\s*Date[:\s]*([A-Za-z0-9,\s]+)",
    energy_usage: r"Total\s*kWh\s*this\s*month[:\s]*([0-9,.]+)",
    generation_charges: r"Generation[:\s]*\$?([0-9,.]+)",
    delivery_charges: r"Delivery[:\s]*\$?([0-9,.]+)",
    nem_credits: r"NEM\s*Credit[:\s]*\$?([0-9,.]+)",
};

static PGE: FieldPatternSet = FieldPatternSet {
    account_number: r"Account\s*No[:\s]*([A-Za-z0-9-]+)",
    billing_period: r"Service\s*from[:\s]*([A-Za-z0-9,\s]+to[A-Za-z0-9,\s]+)",
    total_amount: r"Total\s*Amount\s*Due[:\s]*\$?([0-9,.]+)",
    due_date: r"Due\s*Date[:\s]*([A-Za-z0-9,\s]+)",
    energy_usage: r"Total\s*Usage[:\s]*([0-9,.]+)\s*kWh",
    generation_charges: r"Generation[:\s]*\$?([0-9,.]+)",
    delivery_charges: r"Delivery[:\s]*\$?([0-9,.]+)",
    nem_credits: r"Net\s*Surplus\s*Compensation[:\s]*\$?([0-9,.]+)",
};

static SCE: FieldPatternSet = FieldPatternSet {
    account_number: r"Account\s*number[:\s]*([A-Za-z0-9-]+)",
    billing_period: r"Billing\s*period[:\s]*([A-Za-z0-9,\s]+to[A-Za-z0-9,\s]+)",
    total_amount: r"Total\s*amount\s*due[:\s]*\$?([0-9,.]+)",
    due_date: r"Payment\s*Due\s*by[:\s]*([A-Za-z0-9,\s]+)",
    energy_usage: r"Total\s*kWh[:\s]*([0-9,.]+)",
    generation_charges: r"Generation[:\s]*\$?([0-9,.]+)",
    delivery_charges: r"Delivery[:\s]*\$?([0-9,.]+)",
    nem_credits: r"NEM\s*Credits[:\s]*\$?([0-9,.]+)",
};

// Payment-summary patterns are the same for every utility — the payment
// block wording is stable across the bills we have seen.
pub const PREVIOUS_BALANCE: &str = r"Previous\s*Balance\s+\$([\d.,-]+)";
pub const PAYMENT_RECEIVED: &str = r"Payment\s*Received\s+\$?(-?[\d.,]+)";
pub const CURRENT_CHARGES: &str = r"Current\s*Charges\s+\+?\$([\d.,]+)";
