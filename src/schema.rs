//! Attribute schemas
//!
//! Declarations of the attributes the provider and its data sources accept
//! and produce. The CLI prints them with the `schema` command.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Bool,
    Number,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    Required,
    Optional,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: AttributeKind,
    pub mode: AttributeMode,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Attributes of each list element
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Attribute>,
}

impl Attribute {
    fn new(name: &'static str, description: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            description,
            kind,
            mode: AttributeMode::Computed,
            sensitive: false,
            nested: Vec::new(),
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, AttributeKind::String)
    }

    pub fn bool(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, AttributeKind::Bool)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, AttributeKind::Number)
    }

    pub fn list(name: &'static str, description: &'static str, nested: Vec<Attribute>) -> Self {
        Self {
            nested,
            ..Self::new(name, description, AttributeKind::List)
        }
    }

    pub fn required(mut self) -> Self {
        self.mode = AttributeMode::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.mode = AttributeMode::Optional;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
