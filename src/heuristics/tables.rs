// src/heuristics/tables.rs

use crate::document::{PageContent, Table};
use crate::model::ChargeLineItem;

/// Keywords that mark a row as belonging to a charge table. Checked against
/// lower-cased header names and cell values alike.
const CHARGE_KEYWORDS: &[&str] = &["charge", "amount", "rate", "kwh"];

/// One data row keyed by its table's headers, in column order.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub columns: Vec<(String, Option<String>)>,
}

impl TableRow {
    /// Value of the first column whose header satisfies the predicate.
    fn value_where(&self, pred: impl Fn(&str) -> bool) -> Option<&str> {
        self.columns
            .iter()
            .find(|(header, _)| pred(header))
            .and_then(|(_, value)| value.as_deref())
    }

    /// A row is charge-relevant if any header or cell mentions a charge
    /// keyword.
    fn is_charge_relevant(&self) -> bool {
        self.columns.iter().any(|(header, value)| {
            let header = header.to_lowercase();
            let value = value.as_deref().unwrap_or("").to_lowercase();
            CHARGE_KEYWORDS
                .iter()
                .any(|k| header.contains(k) || value.contains(k))
        })
    }
}

/// Turn one raw table into row-mappings.
///
/// Row 0 is the header row (`Column_<i>` synthesized for blank headers);
/// header-only and empty tables yield nothing, blank data rows are skipped,
/// and cells beyond the header count are dropped. Table layouts are
/// unpredictable across bill formats, so none of this is an error.
pub fn rows_from_table(table: &Table) -> Vec<TableRow> {
    if table.len() <= 1 {
        return Vec::new();
    }

    let headers: Vec<String> = table[0]
        .iter()
        .enumerate()
        .map(|(i, h)| match h.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Column_{i}"),
        })
        .collect();

    let mut rows = Vec::new();
    for raw in &table[1..] {
        let blank = raw
            .iter()
            .all(|cell| cell.as_deref().map(str::trim).unwrap_or("").is_empty());
        if blank {
            continue;
        }

        let columns = raw
            .iter()
            .take(headers.len())
            .enumerate()
            .map(|(i, cell)| {
                let value = cell.as_deref().map(str::trim).filter(|v| !v.is_empty());
                (headers[i].clone(), value.map(str::to_string))
            })
            .collect();
        rows.push(TableRow { columns });
    }
    rows
}

/// Charge line items from one row: needs a description-like column and an
/// amount-like column, both non-empty. Rows lacking either contribute
/// nothing, a silent skip rather than a failure.
fn charge_from_row(row: &TableRow) -> Option<ChargeLineItem> {
    let description = row.value_where(|h| h.to_lowercase().contains("desc"))?;
    let amount = row.value_where(|h| h.to_lowercase().contains("amount") || h.contains('$'))?;
    Some(ChargeLineItem::new(
        description,
        amount.replace('$', "").trim(),
    ))
}

/// Scan one page's raw tables for charge line items.
pub fn charges_from_page(page: &PageContent) -> Vec<ChargeLineItem> {
    let mut charges = Vec::new();
    for table in &page.tables {
        for row in rows_from_table(table) {
            if !row.is_charge_relevant() {
                continue;
            }
            if let Some(item) = charge_from_row(&row) {
                charges.push(item);
            }
        }
    }
    charges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        rows.iter()
            .map(|row| row.iter().map(|c| Some(c.to_string())).collect())
            .collect()
    }

    fn page_with(tables: Vec<Table>) -> PageContent {
        PageContent {
            text: String::new(),
            tables,
        }
    }

    #[test]
    fn charge_table_yields_stripped_amount() {
        let page = page_with(vec![table(&[
            &["Description", "Amount"],
            &["Delivery Charge", "$12.00"],
        ])]);
        let charges = charges_from_page(&page);
        assert_eq!(charges, vec![ChargeLineItem::new("Delivery Charge", "12.00")]);
    }

    #[test]
    fn unrelated_table_yields_nothing() {
        let page = page_with(vec![table(&[
            &["Date", "Notes"],
            &["2024-07-01", "meter read"],
        ])]);
        assert!(charges_from_page(&page).is_empty());
    }

    #[test]
    fn header_only_table_is_skipped() {
        let page = page_with(vec![table(&[&["Description", "Amount"]])]);
        assert!(charges_from_page(&page).is_empty());
    }

    #[test]
    fn blank_headers_are_synthesized() {
        let raw: Table = vec![
            vec![None, Some("Amount".to_string())],
            vec![Some("x".to_string()), Some("$1.00".to_string())],
        ];
        let rows = rows_from_table(&raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns[0].0, "Column_0");
        assert_eq!(rows[0].columns[1].0, "Amount");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let raw: Table = vec![
            vec![Some("Description".to_string()), Some("Amount".to_string())],
            vec![Some("  ".to_string()), None],
            vec![Some("Generation".to_string()), Some("$75.00".to_string())],
        ];
        assert_eq!(rows_from_table(&raw).len(), 1);
    }

    #[test]
    fn extra_cells_beyond_headers_are_dropped() {
        let raw: Table = vec![
            vec![Some("Description".to_string()), Some("Amount".to_string())],
            vec![
                Some("Taxes".to_string()),
                Some("$0.50".to_string()),
                Some("stray".to_string()),
            ],
        ];
        let rows = rows_from_table(&raw);
        assert_eq!(rows[0].columns.len(), 2);
    }

    #[test]
    fn credit_rows_keep_their_sign() {
        let page = page_with(vec![table(&[
            &["Description", "Amount"],
            &["Generation Credit", "-$33.29"],
        ])]);
        let charges = charges_from_page(&page);
        assert_eq!(charges[0].amount, "-33.29");
    }
}
