use std::collections::BTreeSet;

/// Fund house prefix of a scheme name: its first word, minus one trailing `-`.
pub fn amc_prefix(scheme_name: &str) -> Option<&str> {
    let first = scheme_name.split_whitespace().next()?;
    let prefix = first.strip_suffix('-').unwrap_or(first);
    (!prefix.is_empty()).then_some(prefix)
}

/// Unique, sorted AMC prefixes across `names`.
pub fn amc_prefixes<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    names
        .into_iter()
        .filter_map(amc_prefix)
        .map(str::to_string)
        .collect()
}
