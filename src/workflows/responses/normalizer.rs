/// Canonical form of an item code: invisible characters stripped, trimmed, upper case.
pub(crate) fn normalize_code(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_ascii_uppercase()
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_code(value)
}
