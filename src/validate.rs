// src/validate.rs
use std::path::{Path, PathBuf};

use crate::dialect::Dialect;

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME_LEN: usize = 255;

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Why a candidate route name was refused. The `Display` text is what the
/// user sees next to the input box.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide a name for the new file (without extension).")]
    Empty,
    #[error("Please provide a name without the extension.")]
    HasExtension,
    #[error("File {0} already exists.")]
    AlreadyExists(String),
    #[error("The file name `{0}` contains characters that are not allowed in a file name.")]
    IllegalCharacters(String),
    #[error("The Java file name must not contain whitespace.")]
    ContainsWhitespace,
    #[error("The Java file name must start with an upper case letter.")]
    NotUpperCase,
}

/// Checks user-entered route names against the naming rules of one dialect.
///
/// Validation only reads the filesystem (for the collision check) and can be
/// called any number of times with the same result.
#[derive(Debug, Clone)]
pub struct NameValidator {
    dialect: Dialect,
    root: PathBuf,
}

impl NameValidator {
    pub fn new(dialect: Dialect, root: impl Into<PathBuf>) -> Self {
        Self {
            dialect,
            root: root.into(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn validate(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty);
        }
        if Path::new(name).extension().is_some() {
            return Err(ValidationError::HasExtension);
        }

        let file_name = self.dialect.file_name(name);
        if self.root.join(&file_name).exists() {
            return Err(ValidationError::AlreadyExists(file_name));
        }
        if !is_portable_file_name(&file_name) || !is_portable_file_name(name) {
            return Err(ValidationError::IllegalCharacters(name.to_string()));
        }

        if !self.dialect.allows_whitespace() && name.chars().any(char::is_whitespace) {
            return Err(ValidationError::ContainsWhitespace);
        }
        if self.dialect == Dialect::Java && !name.starts_with(|c: char| c.is_uppercase()) {
            return Err(ValidationError::NotUpperCase);
        }

        Ok(())
    }
}

fn is_portable_file_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_FILE_NAME_LEN || name == "." || name == ".." {
        return false;
    }
    if name.chars().any(|c| ILLEGAL_CHARS.contains(&c) || c.is_ascii_control()) {
        return false;
    }
    !RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn validator(dialect: Dialect) -> (tempfile::TempDir, NameValidator) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jbangInitRoute.camel.yaml"), "- from: {}\n").unwrap();
        fs::write(dir.path().join("ModelineCompletion.java"), "class ModelineCompletion {}\n").unwrap();
        fs::write(dir.path().join("existing.xml"), "<routes/>\n").unwrap();
        let v = NameValidator::new(dialect, dir.path());
        (dir, v)
    }

    #[test]
    fn blank_names_are_rejected_for_every_dialect() {
        for dialect in Dialect::ALL {
            let (_dir, v) = validator(dialect);
            for name in ["", " ", "\t", "   \n"] {
                assert_eq!(v.validate(name), Err(ValidationError::Empty), "{dialect}: {name:?}");
            }
        }
    }

    #[test]
    fn names_carrying_an_extension_are_rejected() {
        let cases = [
            (Dialect::Yaml, "name-with-extension.yaml"),
            (Dialect::Java, "CamelRoute.java"),
            (Dialect::Xml, "route.xml"),
        ];
        for (dialect, name) in cases {
            let (_dir, v) = validator(dialect);
            assert_eq!(v.validate(name), Err(ValidationError::HasExtension));
        }
    }

    #[test]
    fn existing_artifacts_are_rejected() {
        let cases = [
            (Dialect::Yaml, "jbangInitRoute", "jbangInitRoute.camel.yaml"),
            (Dialect::Java, "ModelineCompletion", "ModelineCompletion.java"),
            (Dialect::Xml, "existing", "existing.xml"),
        ];
        for (dialect, name, file) in cases {
            let (_dir, v) = validator(dialect);
            assert_eq!(
                v.validate(name),
                Err(ValidationError::AlreadyExists(file.to_string()))
            );
        }
    }

    #[test]
    fn collision_only_counts_the_same_dialect() {
        let (_dir, v) = validator(Dialect::Xml);
        assert_eq!(v.validate("jbangInitRoute"), Ok(()));
    }

    #[test]
    fn illegal_characters_are_rejected() {
        for dialect in Dialect::ALL {
            let (_dir, v) = validator(dialect);
            for name in ["spe<ia|", "Route?", "Dir/Route", "Nul\u{0}l", "CON"] {
                assert!(
                    matches!(v.validate(name), Err(ValidationError::IllegalCharacters(_))),
                    "{dialect}: {name:?}"
                );
            }
        }
    }

    #[test]
    fn overly_long_names_are_rejected() {
        let (_dir, v) = validator(Dialect::Yaml);
        let name = "r".repeat(250);
        assert!(matches!(
            v.validate(&name),
            Err(ValidationError::IllegalCharacters(_))
        ));
    }

    #[test]
    fn whitespace_depends_on_dialect() {
        let (_dir, yaml) = validator(Dialect::Yaml);
        let (_dir2, xml) = validator(Dialect::Xml);
        let (_dir3, java) = validator(Dialect::Java);
        assert_eq!(yaml.validate("name with spaces"), Ok(()));
        assert_eq!(xml.validate("name with spaces"), Ok(()));
        assert_eq!(
            java.validate("Name With Spaces"),
            Err(ValidationError::ContainsWhitespace)
        );
    }

    #[test]
    fn java_names_start_upper_case() {
        let (_dir, v) = validator(Dialect::Java);
        assert_eq!(v.validate("camelRoute"), Err(ValidationError::NotUpperCase));
        assert_eq!(v.validate("CamelRoute"), Ok(()));
    }

    #[test]
    fn yaml_names_may_start_lower_case() {
        let (_dir, v) = validator(Dialect::Yaml);
        assert_eq!(v.validate("test-route"), Ok(()));
    }

    #[test]
    fn rejections_always_carry_a_reason() {
        let errors = [
            ValidationError::Empty,
            ValidationError::HasExtension,
            ValidationError::AlreadyExists("a.xml".into()),
            ValidationError::IllegalCharacters("a|b".into()),
            ValidationError::ContainsWhitespace,
            ValidationError::NotUpperCase,
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn validation_is_repeatable() {
        let (_dir, v) = validator(Dialect::Java);
        assert_eq!(v.validate("camelRoute"), v.validate("camelRoute"));
        assert_eq!(v.validate("CamelRoute"), v.validate("CamelRoute"));
    }
}
