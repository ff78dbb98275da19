// src/model.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Note attached to the summary when the bill closes in credit.
pub const CREDIT_NOTE: &str = "Credit balance. No payment required.";

/// One named monetary component of a bill.
///
/// The amount stays a display string: downstream display must reproduce
/// the bill's original notation, including a leading minus for credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLineItem {
    pub charge_type: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ChargeLineItem {
    pub fn new(charge_type: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            charge_type: charge_type.into(),
            amount: amount.into(),
            unit: None,
        }
    }
}

/// Summary-field name → display value.
pub type BillSummary = BTreeMap<String, String>;

/// The canonical record every extraction strategy converges to.
///
/// `error` present means extraction failed and the other fields must be
/// treated as absent by consumers; they still default to empty containers
/// so they are safe to read unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(default)]
    pub bill_summary: BillSummary,
    #[serde(default)]
    pub charges_breakdown: Vec<ChargeLineItem>,
    #[serde(default)]
    pub nem_details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BillRecord {
    /// Failure record: `error` set, everything else empty.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Build a record from a parsed model response.
    ///
    /// Missing top-level keys are backfilled with empty defaults; partial
    /// structure is acceptable, total unparsability is not. Numeric JSON
    /// values are coerced to their display-string form.
    pub fn from_model_value(value: &Value) -> Self {
        let mut record = Self::default();

        if let Some(summary) = value.get("bill_summary").and_then(Value::as_object) {
            for (key, val) in summary {
                if let Some(text) = display_string(val) {
                    record.bill_summary.insert(key.clone(), text);
                }
            }
        }

        if let Some(charges) = value.get("charges_breakdown").and_then(Value::as_array) {
            for entry in charges {
                let Some(charge_type) = entry.get("charge_type").and_then(display_string) else {
                    continue;
                };
                let Some(amount) = entry.get("amount").and_then(display_string) else {
                    continue;
                };
                record.charges_breakdown.push(ChargeLineItem {
                    charge_type,
                    amount,
                    unit: entry.get("unit").and_then(display_string),
                });
            }
        }

        if let Some(nem) = value.get("nem_details").and_then(Value::as_object) {
            for (key, val) in nem {
                if let Some(text) = display_string(val) {
                    record.nem_details.insert(key.clone(), text);
                }
            }
        }

        record.annotate_credit_balance();
        record
    }

    /// If the total amount due is negative the bill closed in credit; add
    /// the note consumers surface to the user. Pure post-processing rule.
    pub fn annotate_credit_balance(&mut self) {
        if let Some(total) = self.bill_summary.get("total_amount_due") {
            if total.trim().starts_with('-') {
                self.bill_summary
                    .insert("note".to_string(), CREDIT_NOTE.to_string());
            }
        }
    }
}

fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_top_level_keys_backfilled() {
        let record = BillRecord::from_model_value(&json!({}));
        assert!(record.bill_summary.is_empty());
        assert!(record.charges_breakdown.is_empty());
        assert!(record.error.is_none());
    }

    #[test]
    fn numeric_summary_values_coerced() {
        let record = BillRecord::from_model_value(&json!({
            "bill_summary": { "current_charges": 22.57 }
        }));
        assert_eq!(
            record.bill_summary.get("current_charges").map(String::as_str),
            Some("22.57")
        );
    }

    #[test]
    fn credit_balance_gets_note() {
        let record = BillRecord::from_model_value(&json!({
            "bill_summary": { "total_amount_due": "-17.02" }
        }));
        assert_eq!(
            record.bill_summary.get("note").map(String::as_str),
            Some(CREDIT_NOTE)
        );
    }

    #[test]
    fn positive_balance_gets_no_note() {
        let record = BillRecord::from_model_value(&json!({
            "bill_summary": { "total_amount_due": "22.57" }
        }));
        assert!(!record.bill_summary.contains_key("note"));
    }

    #[test]
    fn charge_entries_without_amount_skipped() {
        let record = BillRecord::from_model_value(&json!({
            "charges_breakdown": [
                { "charge_type": "Delivery Charges", "amount": "31.47" },
                { "charge_type": "Broken Entry" }
            ]
        }));
        assert_eq!(record.charges_breakdown.len(), 1);
        assert_eq!(record.charges_breakdown[0].amount, "31.47");
    }
}
