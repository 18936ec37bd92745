// src/dialect.rs
use std::fmt;
use std::str::FromStr;

/// Route-definition formats that `camel init` knows how to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Yaml,
    Java,
    Xml,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Yaml, Dialect::Java, Dialect::Xml];

    /// Suffix appended to the user's name. Case-sensitive.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Yaml => ".camel.yaml",
            Dialect::Java => ".java",
            Dialect::Xml => ".xml",
        }
    }

    pub fn command_id(self) -> &'static str {
        match self {
            Dialect::Yaml => "camel.jbang.routes.yaml",
            Dialect::Java => "camel.jbang.routes.java",
            Dialect::Xml => "camel.jbang.routes.xml",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dialect::Yaml => "YAML",
            Dialect::Java => "Java",
            Dialect::Xml => "XML",
        }
    }

    /// Whether file names for this dialect may contain whitespace.
    pub fn allows_whitespace(self) -> bool {
        !matches!(self, Dialect::Java)
    }

    pub fn file_name(self, name: &str) -> String {
        format!("{name}{}", self.extension())
    }

    pub fn from_command_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.command_id() == id)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown Camel DSL `{0}` (expected yaml, java or xml)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(dialect) = Self::from_command_id(s) {
            return Ok(dialect);
        }
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Dialect::Yaml),
            "java" => Ok(Dialect::Java),
            "xml" => Ok(Dialect::Xml),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
