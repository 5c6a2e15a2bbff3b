//! # Transforms
//!
//! Pure string normalizers applied after a field's rules pass. Each function
//! here is idempotent: applying it to its own output returns that output
//! unchanged, which keeps successfully validated records stable under
//! re-validation.

/// Capitalize every space-separated word.
///
/// The input is trimmed and split on single spaces. Empty segments (from
/// doubled spaces) are dropped rather than indexed, so the output joins the
/// remaining words with exactly one space. Only the first character of each
/// word is uppercased; the rest is kept as written.
///
/// ```
/// use formcheck_schema::transform::capitalize_words;
///
/// assert_eq!(capitalize_words(" ana  paula "), "Ana Paula");
/// assert_eq!(capitalize_words("x"), "X");
/// ```
pub fn capitalize_words(value: &str) -> String {
    value
        .trim()
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the whole value and strip surrounding whitespace.
pub fn lowercase(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Strip surrounding whitespace.
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}
