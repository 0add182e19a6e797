//! Reshapes free-form résumé content into a uniform labeled tree.
//!
//! Job and education details may be written as plain strings, lists, or
//! `category: content` mappings nested in any combination. Templates render
//! the normalized form as nested bullet lists, using labels as sub-headers.

use serde_json::{Map, Value};

/// Key holding the label of a pair once converted for templates.
pub const LABEL_KEY: &str = "label";
/// Key holding the detail of a pair once converted for templates.
pub const DETAIL_KEY: &str = "detail";

/// A (label, detail) entry of a [`Detail::Labeled`] sequence.
pub type LabeledEntry = (Option<String>, Detail);

/// Normalized content.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// A leaf value, passed through unchanged.
    Scalar(Value),
    /// Ordered details without labels.
    Plain(Vec<Detail>),
    /// Ordered labeled entries.
    ///
    /// `unlabeled` holds the elements of the source sequence that came
    /// before its first mapping; they always precede every entry.
    Labeled {
        unlabeled: Vec<Detail>,
        entries: Vec<LabeledEntry>,
    },
}

/// Normalizes an arbitrary content tree.
///
/// - a mapping becomes a labeled sequence keyed by its own keys, in order;
/// - a sequence is walked in keyed mode: once a mapping element is seen,
///   every later element of *that* sequence is emitted as a pair (scalars
///   and nested sequences with no label). Earlier elements stay bare;
/// - a scalar is returned unchanged.
pub fn normalize(value: &Value) -> Detail {
    match value {
        Value::Object(map) => Detail::Labeled {
            unlabeled: Vec::new(),
            entries: labeled_entries(map).collect(),
        },
        Value::Array(items) => normalize_sequence(items),
        scalar => Detail::Scalar(scalar.clone()),
    }
}

fn normalize_sequence(items: &[Value]) -> Detail {
    let mut keyed = false;
    let mut unlabeled = Vec::new();
    let mut entries = Vec::new();

    for item in items {
        if let Value::Object(map) = item {
            keyed = true;
            entries.extend(labeled_entries(map));
        } else if keyed {
            entries.push((None, normalize(item)));
        } else {
            unlabeled.push(normalize(item));
        }
    }

    if keyed {
        Detail::Labeled { unlabeled, entries }
    } else {
        Detail::Plain(unlabeled)
    }
}

fn labeled_entries(map: &Map<String, Value>) -> impl Iterator<Item = LabeledEntry> + '_ {
    map.iter().map(|(k, v)| (Some(k.clone()), normalize(v)))
}

impl Detail {
    /// Converts to the JSON shape templates consume.
    ///
    /// Sequences become arrays; a pair becomes `{"label": .., "detail": ..}`
    /// with a `null` label when absent.
    pub fn to_value(&self) -> Value {
        match self {
            Detail::Scalar(v) => v.clone(),
            Detail::Plain(items) => Value::Array(items.iter().map(Detail::to_value).collect()),
            Detail::Labeled { unlabeled, entries } => {
                let mut out: Vec<Value> = unlabeled.iter().map(Detail::to_value).collect();
                out.extend(entries.iter().map(|(label, detail)| pair_value(label.as_deref(), detail)));
                Value::Array(out)
            }
        }
    }

    /// Number of top-level elements; 1 for a scalar.
    pub fn len(&self) -> usize {
        match self {
            Detail::Scalar(_) => 1,
            Detail::Plain(items) => items.len(),
            Detail::Labeled { unlabeled, entries } => unlabeled.len() + entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn pair_value(label: Option<&str>, detail: &Detail) -> Value {
    let mut pair = Map::with_capacity(2);
    pair.insert(
        LABEL_KEY.to_string(),
        label.map_or(Value::Null, |l| Value::String(l.to_string())),
    );
    pair.insert(DETAIL_KEY.to_string(), detail.to_value());
    Value::Object(pair)
}

/// True for values produced by [`Detail::to_value`] for a labeled pair.
pub fn is_labeled_pair(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => {
            map.len() == 2
                && map.get(DETAIL_KEY).is_some()
                && matches!(map.get(LABEL_KEY), Some(Value::String(_) | Value::Null))
        }
        None => false,
    }
}
