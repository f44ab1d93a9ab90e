//! Rendering of the individual Flux pipeline stages.

/// Separator placed before every stage after the first
pub const STAGE_SEPARATOR: &str = "\n  |> ";

/// Separator between the pipelines of different aggregate functions
pub const PIPELINE_SEPARATOR: &str = "\n\n";

/// Escapes `\` and `"` for use inside a Flux string literal
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whether `name` can be emitted bare, e.g. as `fn: <name>`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quoted Flux string literal
pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

pub fn from_bucket(bucket: &str) -> String {
    format!("from(bucket: {})", string_literal(bucket))
}

pub fn range() -> String {
    "range(start: v.timeRangeStart, stop: v.timeRangeStop)".to_string()
}

/// Column reference `r["key"]`
pub fn column(key: &str) -> String {
    format!("r[{}]", string_literal(key))
}

/// `filter` stage matching any of `values` on column `key`; None without values
pub fn filter<'a>(key: &str, values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let column = column(key);
    let predicate = values
        .into_iter()
        .map(|value| format!("{} == {}", column, string_literal(value)))
        .collect::<Vec<_>>()
        .join(" or ");
    if predicate.is_empty() {
        return None;
    }
    Some(format!("filter(fn: (r) => {})", predicate))
}

/// `group` stage over `columns`; None without columns
pub fn group<'a>(columns: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let columns: Vec<String> = columns.into_iter().map(string_literal).collect();
    if columns.is_empty() {
        return None;
    }
    Some(format!("group(columns: [{}])", columns.join(", ")))
}

/// `aggregateWindow` stage. `function` must be an identifier (see
/// [`is_identifier`]); `every` is emitted verbatim and left to the executor
/// to validate.
pub fn aggregate_window(every: &str, function: &str, create_empty: bool) -> String {
    format!(
        "aggregateWindow(every: {}, fn: {}, createEmpty: {})",
        every, function, create_empty
    )
}

pub fn yield_result(name: &str) -> String {
    format!("yield(name: {})", string_literal(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\temp"), r"C:\\temp");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("mean"));
        assert!(is_identifier("_custom2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2max"));
        assert!(!is_identifier("max)"));
        assert!(!is_identifier("me\"an"));
    }

    #[test]
    fn test_filter_combines_values_with_or() {
        assert_eq!(
            filter("host", ["a", "b"]).unwrap(),
            r#"filter(fn: (r) => r["host"] == "a" or r["host"] == "b")"#
        );
        assert_eq!(filter("host", std::iter::empty()), None);
    }

    #[test]
    fn test_group() {
        assert_eq!(group(["_time"]).unwrap(), r#"group(columns: ["_time"])"#);
        assert_eq!(
            group(["host", "region"]).unwrap(),
            r#"group(columns: ["host", "region"])"#
        );
        assert_eq!(group(std::iter::empty()), None);
    }

    #[test]
    fn test_aggregate_and_yield() {
        assert_eq!(
            aggregate_window("13s", "max", true),
            "aggregateWindow(every: 13s, fn: max, createEmpty: true)"
        );
        assert_eq!(yield_result("max"), r#"yield(name: "max")"#);
    }
}
