//! String-based tool argument parsing.
//!
//! Action inputs arrive as free text like `schema_name='public',
//! object_type='table'`. Values may or may not be quoted, and the model
//! sometimes sends a bare value instead of `name=value`.

use std::collections::HashMap;

/// Strip a leading `name=` and surrounding quotes from a fragment.
pub fn strip_assignment(fragment: &str) -> String {
    let value = match fragment.split_once('=') {
        Some((_, value)) => value,
        None => fragment,
    };
    value.trim().trim_matches('\'').trim_matches('"').to_string()
}

/// Parse `name=value` fragments separated by commas.
///
/// Bare fragments (no `=`) are skipped; callers that accept a single bare
/// value use [`strip_assignment`] directly.
pub fn parse_named_args(input: &str) -> HashMap<String, String> {
    let mut args = HashMap::new();
    for fragment in input.split(',') {
        if let Some((name, value)) = fragment.split_once('=') {
            args.insert(
                name.trim().trim_matches('\'').trim_matches('"').to_string(),
                value.trim().trim_matches('\'').trim_matches('"').to_string(),
            );
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_assignment_and_quotes() {
        assert_eq!(strip_assignment("schema_name='public'"), "public");
        assert_eq!(strip_assignment("object_type=\"table\""), "table");
        assert_eq!(strip_assignment("public"), "public");
        assert_eq!(strip_assignment("  'cd'  "), "cd");
    }

    #[test]
    fn parses_comma_separated_named_args() {
        let args = parse_named_args("schema_name='public', object_type='view'");
        assert_eq!(args.get("schema_name").map(String::as_str), Some("public"));
        assert_eq!(args.get("object_type").map(String::as_str), Some("view"));
    }

    #[test]
    fn bare_values_produce_no_named_args() {
        let args = parse_named_args("SELECT * FROM public.reservations");
        assert!(args.is_empty());
    }
}
