//! Display name handling for dataset identifiers
//!
//! Turns snake_case identifiers into title-cased labels:
//! "civil_and_commercial_code" → "Civil And Commercial Code"

/// Get human-readable name for a data ID
pub fn get_display_name(data_id: &str) -> String {
    data_id
        .replace('_', " ")
        .split(' ')
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
