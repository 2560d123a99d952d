/// Canonical form of a tag name: surrounding quotes and whitespace removed.
/// Applying it twice gives the same result as applying it once.
pub fn normalize_tag_name(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let unquoted = strip_quote_layer(current).trim();
        if unquoted.len() == current.len() {
            return current.to_string();
        }
        current = unquoted;
    }
}

fn strip_quote_layer(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
