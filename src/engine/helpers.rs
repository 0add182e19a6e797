//! Template helpers: type predicates and text transforms.
//!
//! Predicates are meant for subexpressions, e.g.
//! `{{#if (is_list details)}}`; transforms can be used inline
//! (`{{clean_style summary}}`) or as subexpressions
//! (`{{#each (prep_details details)}}`).

use crate::normalize::{is_labeled_pair, normalize};
use handlebars::{Handlebars, handlebars_helper};
use serde_json::Value;

handlebars_helper!(is_str: |v: Json| v.is_string());
handlebars_helper!(is_list: |v: Json| v.is_array());
handlebars_helper!(is_tuple: |v: Json| is_labeled_pair(v));
handlebars_helper!(is_dict: |v: Json| v.is_object() && !is_labeled_pair(v));
handlebars_helper!(is_collection: |v: Json| v.is_array() || v.is_object());
handlebars_helper!(prep_details: |v: Json| normalize(v).to_value());
handlebars_helper!(clean_style: |v: Json| map_text(v, clean_quotes_and_dashes));
handlebars_helper!(convert_style: |v: Json| map_text(v, convert_quotes_to_entities));

/// Registers every helper on `registry`.
pub fn register_all(registry: &mut Handlebars<'_>) {
    registry.register_helper("is_str", Box::new(is_str));
    registry.register_helper("is_list", Box::new(is_list));
    registry.register_helper("is_tuple", Box::new(is_tuple));
    registry.register_helper("is_dict", Box::new(is_dict));
    registry.register_helper("is_collection", Box::new(is_collection));
    registry.register_helper("prep_details", Box::new(prep_details));
    registry.register_helper("clean_style", Box::new(clean_style));
    registry.register_helper("convert_style", Box::new(convert_style));
}

// Non-text values pass through untouched.
fn map_text(v: &Value, f: fn(&str) -> String) -> Value {
    match v {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

/// Curly quotes to straight quotes, em and en dashes to hyphens.
pub fn clean_quotes_and_dashes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2014}' | '\u{2013}' => '-',
            other => other,
        })
        .collect()
}

/// Curly quotes to numeric HTML entities. Dashes are left alone.
pub fn convert_quotes_to_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{201C}' => out.push_str("&#147;"),
            '\u{201D}' => out.push_str("&#148;"),
            '\u{2018}' => out.push_str("&#145;"),
            '\u{2019}' => out.push_str("&#146;"),
            other => out.push(other),
        }
    }
    out
}
