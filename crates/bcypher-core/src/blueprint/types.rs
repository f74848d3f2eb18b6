//! Parsed API Blueprint document.

use reqwest::Method;

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub groups: Vec<ResourceGroup>,
}

impl Blueprint {
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.groups.iter().flat_map(|group| group.resources.iter())
    }
}

/// A `# Group` section. Resources declared before any group land in an
/// unnamed group.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    pub name: Option<String>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Declared name, e.g. `Wallet Collection`.
    pub name: String,
    pub uri_template: String,
    pub parameters: Vec<Parameter>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub method: Method,
    /// Set when the action heading carries its own URI, `[GET /path]`.
    pub uri_template: Option<String>,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub required: bool,
    pub description: String,
}
