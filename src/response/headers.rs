//! Header materialization.
//!
//! # Responsibilities
//! - Hold response headers with case-insensitive names
//! - Merge fixed route headers with runtime headers (runtime wins)
//! - Restrict runtime headers to a declared allow-list
//! - Pass through only reserved framework headers when nothing is declared
//!
//! # Design Decisions
//! - Entries are ordered by lowercase name so output is deterministic
//! - Content-Type never travels through the header set; the resolver owns it

use std::collections::BTreeMap;

/// Framework-reserved headers that pass through when a route declares none.
pub const RESERVED_HEADERS: &[&str] = &[
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Headers",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Credentials",
    "Access-Control-Expose-Headers",
    "Access-Control-Max-Age",
];

pub const CONTENT_TYPE: &str = "Content-Type";
pub const LOCATION: &str = "Location";

/// Header map keyed case-insensitively.
///
/// Inserting a name that differs only in case replaces the existing entry and
/// adopts the new spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: BTreeMap<String, (String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in lowercase-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Copy out as a plain map keyed by the stored spelling.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Normalized header declaration for one route branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeaderDecl {
    /// Nothing declared.
    #[default]
    Undeclared,
    /// Fixed values, overridable at runtime.
    Fixed(HeaderSet),
    /// Names whose values come only from the runtime headers.
    AllowList(Vec<String>),
}

/// Resolves a header declaration against runtime headers.
#[derive(Debug, Clone)]
pub struct HeaderMaterializer {
    passthrough: Vec<String>,
}

impl Default for HeaderMaterializer {
    fn default() -> Self {
        Self::new(RESERVED_HEADERS.iter().copied())
    }
}

impl HeaderMaterializer {
    /// Create a materializer passing `passthrough` names through undeclared routes.
    pub fn new<I, S>(passthrough: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            passthrough: passthrough
                .into_iter()
                .map(|name| name.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    fn passes_through(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.passthrough.iter().any(|allowed| *allowed == name)
    }

    pub fn materialize(&self, declaration: &HeaderDecl, runtime: &HeaderSet) -> HeaderSet {
        let mut headers = match declaration {
            HeaderDecl::Fixed(fixed) => {
                let mut headers = fixed.clone();
                for (name, value) in runtime.iter() {
                    headers.insert(name, value);
                }
                headers
            }
            HeaderDecl::AllowList(names) => names
                .iter()
                .filter_map(|name| runtime.get(name).map(|value| (name.as_str(), value)))
                .collect(),
            HeaderDecl::Undeclared => runtime
                .iter()
                .filter(|(name, _)| self.passes_through(name))
                .collect(),
        };
        headers.remove(CONTENT_TYPE);
        headers
    }
}
