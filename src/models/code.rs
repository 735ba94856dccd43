/// Generates the next entity code for a given prefix and year.
///
/// Codes look like `INV-2025-001`. The next sequence number is one past
/// the highest numeric suffix among existing codes sharing the
/// `{PREFIX}-{YEAR}-` stem; codes with a non-numeric suffix are ignored.
/// Safe only under a single writer, which the store guarantees.
pub fn next_code<'a>(
    existing: impl Iterator<Item = &'a str>,
    prefix: &str,
    year: i16,
) -> String {
    let stem = format!("{prefix}-{year}-");

    let max_seq = existing
        .filter_map(|code| code.strip_prefix(&stem))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{stem}{:03}", max_seq + 1)
}
