use std::collections::HashMap;

use vendorbook_core::ImportRow;

/// Collapse rows sharing a legal name to the last one in file order.
///
/// Survivors keep their relative order; each sits where its name last
/// appeared.
pub fn dedupe_last(rows: Vec<ImportRow>) -> Vec<ImportRow> {
    let mut last: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        last.insert(row.legal_name.clone(), idx);
    }

    let before = rows.len();
    let kept: Vec<ImportRow> = rows
        .into_iter()
        .enumerate()
        .filter(|(idx, row)| last.get(&row.legal_name) == Some(idx))
        .map(|(_, row)| row)
        .collect();

    if kept.len() < before {
        log::debug!("{} duplicate row(s) collapsed by legal name", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, address: &str, line: usize) -> ImportRow {
        ImportRow {
            legal_name: name.to_string(),
            external_id: None,
            address: Some(address.to_string()),
            source_row: line,
        }
    }

    #[test]
    fn later_row_wins() {
        let rows = vec![row("Acme", "old", 2), row("Acme", "new", 3)];
        let kept = dedupe_last(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].address.as_deref(), Some("new"));
        assert_eq!(kept[0].source_row, 3);
    }

    #[test]
    fn survivors_sit_at_last_occurrence() {
        let rows = vec![
            row("Acme", "a1", 2),
            row("Globex", "g1", 3),
            row("Initech", "i1", 4),
            row("Acme", "a2", 5),
        ];
        let names: Vec<String> = dedupe_last(rows).into_iter().map(|r| r.legal_name).collect();
        assert_eq!(names, vec!["Globex", "Initech", "Acme"]);
    }

    #[test]
    fn names_are_compared_exactly() {
        let rows = vec![row("Acme", "a", 2), row("ACME", "b", 3)];
        assert_eq!(dedupe_last(rows).len(), 2);
    }
}
