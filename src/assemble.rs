// src/assemble.rs

use crate::heuristics::{BillKind, PatternFields};
use crate::model::{BillRecord, ChargeLineItem};
use tracing::info;

/// Merge the extraction strategies into one canonical record.
///
/// A model record without an error is the base record, and pattern fields
/// only fill keys the model left absent. A model record carrying an error
/// is returned unchanged: its other fields are invalid by contract.
/// With no model record at all, the record is assembled from the pattern
/// and table strategies alone. Never fails; empty strategies yield empty
/// collections, not an error.
pub fn assemble(
    fields: &PatternFields,
    table_charges: Vec<ChargeLineItem>,
    bill_kind: BillKind,
    ai_record: Option<BillRecord>,
) -> BillRecord {
    let mut record = match ai_record {
        Some(record) if record.is_error() => return record,
        Some(mut record) => {
            supplement_summary(&mut record, fields);
            record
        }
        None => from_patterns(fields, table_charges, bill_kind),
    };

    record.annotate_credit_balance();
    let (filled, total) = fields.coverage();
    info!(
        filled,
        total,
        charges = record.charges_breakdown.len(),
        "Assembled bill record"
    );
    record
}

/// Build a record from the pattern and table strategies alone.
fn from_patterns(
    fields: &PatternFields,
    table_charges: Vec<ChargeLineItem>,
    bill_kind: BillKind,
) -> BillRecord {
    let mut record = BillRecord::default();

    let summary_fields = [
        ("account_number", &fields.account_number),
        ("billing_period", &fields.billing_period),
        ("total_amount", &fields.total_amount),
        ("due_date", &fields.due_date),
        ("energy_usage", &fields.energy_usage),
        ("previous_balance", &fields.previous_balance),
        ("payment_received", &fields.payment_received),
        ("current_charges", &fields.current_charges),
    ];
    for (key, value) in summary_fields {
        if let Some(value) = value {
            record.bill_summary.insert(key.to_string(), value.clone());
        }
    }
    record
        .bill_summary
        .insert("bill_type".to_string(), bill_kind.as_str().to_string());

    if let Some(generation) = &fields.generation_charges {
        record
            .charges_breakdown
            .push(ChargeLineItem::new("Generation Charges", generation.clone()));
    }
    if let Some(delivery) = &fields.delivery_charges {
        record
            .charges_breakdown
            .push(ChargeLineItem::new("Delivery Charges", delivery.clone()));
    }
    record.charges_breakdown.extend(table_charges);

    if let Some(credits) = &fields.nem_credits {
        record
            .nem_details
            .insert("credits".to_string(), credits.clone());
    }

    record
}

/// Fill summary keys the model left absent. The pattern key `total_amount`
/// stands in for `total_amount_due` only when the model produced neither,
/// so the merged summary never carries duplicate totals.
fn supplement_summary(record: &mut BillRecord, fields: &PatternFields) {
    let supplements = [
        ("account_number", &fields.account_number),
        ("billing_period", &fields.billing_period),
        ("due_date", &fields.due_date),
        ("energy_usage", &fields.energy_usage),
        ("previous_balance", &fields.previous_balance),
        ("payment_received", &fields.payment_received),
        ("current_charges", &fields.current_charges),
    ];
    for (key, value) in supplements {
        if let Some(value) = value {
            record
                .bill_summary
                .entry(key.to_string())
                .or_insert_with(|| value.clone());
        }
    }

    if let Some(total) = &fields.total_amount {
        if !record.bill_summary.contains_key("total_amount")
            && !record.bill_summary.contains_key("total_amount_due")
        {
            record
                .bill_summary
                .insert("total_amount_due".to_string(), total.clone());
        }
    }

    if let Some(credits) = &fields.nem_credits {
        record
            .nem_details
            .entry("credits".to_string())
            .or_insert_with(|| credits.clone());
    }
}
