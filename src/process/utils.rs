/// Byte-order mark some spreadsheet exports put in front of the first header.
const BOM: char = '\u{feff}';

/// Trim whitespace, a leading BOM and outer quotes from a header cell.
pub fn clean_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches(BOM).trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}
