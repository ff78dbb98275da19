// src/lib.rs

//! Extraction pipeline for utility-bill documents: deterministic pattern
//! rules per utility, an AI-assisted structured-extraction path, and a
//! single canonical record both strategies converge to.

pub mod assemble;
pub mod config;
pub mod document;
pub mod heuristics;
pub mod llm;
pub mod model;
pub mod pdf;

use config::{LlmBackend, LlmSection};
use document::DocumentText;
use model::{BillRecord, ChargeLineItem};
use tracing::info;

/// Rule-based extraction only: utility detection, the matching pattern set,
/// and table-derived charges. Pure function of the document.
pub fn extract_with_rules(doc: &DocumentText) -> BillRecord {
    let text = doc.full_text();
    let utility = heuristics::rules::detect_utility(&text);
    info!(utility = utility.as_str(), "Detected utility");

    let set = heuristics::rules::FieldPatternSet::for_utility(utility);
    let fields = heuristics::extract_fields(&text, set);
    let bill_kind = heuristics::identify_bill_kind(&text);

    let mut table_charges: Vec<ChargeLineItem> = Vec::new();
    for page in &doc.pages {
        table_charges.extend(heuristics::tables::charges_from_page(page));
    }

    assemble::assemble(&fields, table_charges, bill_kind, None)
}

/// Full pipeline over an already-acquired document.
///
/// With the heuristics backend this is the rules path; otherwise the model
/// record is the base and pattern fields supplement it. Never fails: every
/// failure mode comes back as a record with `error` set.
pub async fn extract_bill(doc: &DocumentText, llm_config: &LlmSection) -> BillRecord {
    if llm_config.backend == LlmBackend::Heuristics {
        return extract_with_rules(doc);
    }

    let text = doc.full_text();
    let ai_record = llm::extract_via_model(&text, llm_config).await;

    let utility = heuristics::rules::detect_utility(&text);
    let set = heuristics::rules::FieldPatternSet::for_utility(utility);
    let fields = heuristics::extract_fields(&text, set);
    let bill_kind = heuristics::identify_bill_kind(&text);

    assemble::assemble(&fields, Vec::new(), bill_kind, Some(ai_record))
}

/// Full pipeline from raw PDF bytes.
pub async fn extract_bill_from_pdf(pdf_bytes: &[u8], llm_config: &LlmSection) -> BillRecord {
    let doc = match pdf::read_document(pdf_bytes) {
        Ok(doc) => doc,
        Err(e) => return BillRecord::from_error(format!("Failed to process the PDF bill: {e}")),
    };
    extract_bill(&doc, llm_config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageContent;

    const SAMPLE: &str = "Account Number: 123456789\nTotal Amount Due: $123.45\nGeneration Charges: $75.00\nDelivery Charges: $48.45";

    #[test]
    fn rules_path_end_to_end() {
        let doc = DocumentText::from_text(SAMPLE);
        let record = extract_with_rules(&doc);

        assert_eq!(
            record.bill_summary.get("account_number").map(String::as_str),
            Some("123456789")
        );
        assert_eq!(
            record.bill_summary.get("total_amount").map(String::as_str),
            Some("123.45")
        );
        assert_eq!(
            record.charges_breakdown,
            vec![
                ChargeLineItem::new("Generation Charges", "75.00"),
                ChargeLineItem::new("Delivery Charges", "48.45"),
            ]
        );
    }

    #[test]
    fn rules_path_is_deterministic() {
        let mut doc = DocumentText::from_text(SAMPLE);
        doc.pages.push(PageContent {
            text: "NEM Credits: $3.10".to_string(),
            tables: vec![vec![
                vec![Some("Description".to_string()), Some("Amount".to_string())],
                vec![Some("Taxes & Fees".to_string()), Some("$0.00".to_string())],
            ]],
        });
        assert_eq!(extract_with_rules(&doc), extract_with_rules(&doc));
    }

    #[test]
    fn table_charges_reach_the_record() {
        let mut doc = DocumentText::from_text(SAMPLE);
        doc.pages.push(PageContent {
            text: String::new(),
            tables: vec![vec![
                vec![Some("Description".to_string()), Some("Amount".to_string())],
                vec![
                    Some("Wildfire Fund Charge".to_string()),
                    Some("$2.93".to_string()),
                ],
            ]],
        });
        let record = extract_with_rules(&doc);
        assert_eq!(record.charges_breakdown.len(), 3);
        assert_eq!(
            record.charges_breakdown[2],
            ChargeLineItem::new("Wildfire Fund Charge", "2.93")
        );
    }

    #[tokio::test]
    async fn heuristics_backend_skips_the_model() {
        let doc = DocumentText::from_text(SAMPLE);
        let record = extract_bill(&doc, &LlmSection::default()).await;
        assert!(record.error.is_none());
        assert_eq!(record.charges_breakdown.len(), 2);
    }
}
