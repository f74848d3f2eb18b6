//! Resource/action → namespace and method name rules.
//!
//! The rules are a fixed table so generated APIs stay stable across blueprint
//! revisions:
//!
//! | resource name        | verb     | method    |
//! |----------------------|----------|-----------|
//! | `X Collection`       | `GET`    | `list`    |
//! | `X Collection`       | `POST`   | `create`  |
//! | `X Other`            | any      | `other`   |
//! | `X`                  | `GET`    | `get`     |
//! | `X`                  | `DELETE` | `remove`  |
//! | `X`                  | `PUT`    | `update`  |
//!
//! Anything else produces no method.

use reqwest::Method;

const COLLECTION_MARKER: &str = "Collection";

const COLLECTION_METHODS: &[(&str, &str)] = &[("GET", "list"), ("POST", "create")];

const ITEM_METHODS: &[(&str, &str)] = &[("GET", "get"), ("DELETE", "remove"), ("PUT", "update")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Collection,
    /// Second name token, e.g. `Balance` in `Address Balance`.
    Alternate(String),
    Item,
}

impl ResourceKind {
    pub fn of(resource_name: &str) -> Self {
        match resource_name.split_whitespace().nth(1) {
            Some(COLLECTION_MARKER) => Self::Collection,
            Some(token) => Self::Alternate(token.to_owned()),
            None => Self::Item,
        }
    }
}

/// Namespace key for a resource: first name token, decapitalized and
/// pluralized (`Address Balance` → `addresses`).
pub fn namespace(resource_name: &str) -> String {
    let base = resource_name.split_whitespace().next().unwrap_or_default();
    pluralize(&decapitalize(base))
}

/// Method name for `verb` on a resource, or `None` when no rule applies.
pub fn method_name(resource_name: &str, verb: &Method) -> Option<String> {
    match ResourceKind::of(resource_name) {
        ResourceKind::Collection => lookup(COLLECTION_METHODS, verb),
        ResourceKind::Alternate(token) => Some(decapitalize(&token)),
        ResourceKind::Item => lookup(ITEM_METHODS, verb),
    }
}

fn lookup(table: &[(&str, &str)], verb: &Method) -> Option<String> {
    table
        .iter()
        .find(|(v, _)| *v == verb.as_str())
        .map(|(_, name)| (*name).to_owned())
}

pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

pub fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
