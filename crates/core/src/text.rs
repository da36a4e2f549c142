// Missing-value handling for free-text cells

/// Cell contents that mean "no value", in addition to the empty string.
/// Matches what spreadsheet exports and the legacy entry form produced.
pub const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "#N/A", "NaN", "nan", "NULL", "null", "None", "<NA>",
];

/// True if `value` (after trimming) is empty or an NA token.
pub fn is_na(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || NA_TOKENS.contains(&v)
}

/// Trimmed value, or `None` when missing.
pub fn clean(value: &str) -> Option<String> {
    if is_na(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Optional value collapsed to a comparable string: missing becomes "".
pub fn comparable(value: Option<&str>) -> &str {
    match value {
        Some(v) if !is_na(v) => v.trim(),
        _ => "",
    }
}
