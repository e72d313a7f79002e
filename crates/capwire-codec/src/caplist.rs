//! The space-delimited, quote-escaped encoding used by multi-value text
//! fields such as `addresses`.
//!
//! Elements containing whitespace or a double quote are wrapped in double
//! quotes with embedded quotes doubled; elements are joined by single
//! spaces. [`unpack`] inverts [`pack`] exactly.

/// Joins list elements into one text value.
pub fn pack(items: &[String]) -> String {
    items
        .iter()
        .map(|item| pack_item(item))
        .collect::<Vec<_>>()
        .join(" ")
}

fn pack_item(item: &str) -> String {
    if item.is_empty() || item.contains(char::is_whitespace) || item.contains('"') {
        format!("\"{}\"", item.replace('"', "\"\""))
    } else {
        item.to_string()
    }
}

/// Splits a packed text value back into its elements.
pub fn unpack(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    // Distinguishes a pending empty quoted element from no element at all.
    let mut started = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
            started = true;
        } else if c.is_whitespace() {
            if started {
                items.push(std::mem::take(&mut current));
                started = false;
            }
        } else {
            current.push(c);
            started = true;
        }
    }
    if started {
        items.push(current);
    }
    items
}
