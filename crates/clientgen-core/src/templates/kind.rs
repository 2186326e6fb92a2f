//! Target template kinds for clientgen.
//!
//! Each kind names one target language and the template namespace its
//! templates live under, both in the embedded set and in override directories.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let kind = TemplateKind::from_str("golang").unwrap();
//! assert_eq!(kind, TemplateKind::Golang);
//! assert_eq!(kind.as_str(), "golang");
//! assert_eq!(kind.extension(), "go");
//!
//! // The default kind is Golang
//! assert_eq!(TemplateKind::default(), TemplateKind::Golang);
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use clap::ValueEnum;

/// Supported template kinds (target languages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, ValueEnum)]
pub enum TemplateKind {
    /// Go backend client
    #[default]
    Golang,
    /// TypeScript frontend client, models and mocks
    #[value(name = "typescript")]
    TypeScript,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "golang" | "go" => Ok(TemplateKind::Golang),
            "typescript" | "ts" => Ok(TemplateKind::TypeScript),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Golang => "golang",
            Self::TypeScript => "typescript",
        }
    }

    /// File extension of generated sources
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Golang => "go",
            Self::TypeScript => "ts",
        }
    }

    /// Returns an iterator over all available template kinds
    pub fn all() -> impl Iterator<Item = Self> {
        use TemplateKind::*;
        [Golang, TypeScript].iter().copied()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_as_str() {
        assert_eq!(TemplateKind::Golang.as_str(), "golang");
        assert_eq!(TemplateKind::TypeScript.as_str(), "typescript");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TemplateKind::Golang), "golang");
        assert_eq!(format!("{}", TemplateKind::TypeScript), "typescript");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "golang".parse::<TemplateKind>().unwrap(),
            TemplateKind::Golang
        );
        assert_eq!("go".parse::<TemplateKind>().unwrap(), TemplateKind::Golang);
        assert_eq!(
            "typescript".parse::<TemplateKind>().unwrap(),
            TemplateKind::TypeScript
        );

        // Test case insensitivity
        assert_eq!(
            "TypeScript".parse::<TemplateKind>().unwrap(),
            TemplateKind::TypeScript
        );
        assert_eq!("GO".parse::<TemplateKind>().unwrap(), TemplateKind::Golang);

        // Test invalid variants
        assert!("rust_axum".parse::<TemplateKind>().is_err());
        assert!("".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(TemplateKind::Golang.extension(), "go");
        assert_eq!(TemplateKind::TypeScript.extension(), "ts");
    }

    #[test]
    fn test_all() {
        let all_kinds: Vec<_> = TemplateKind::all().collect();
        assert_eq!(all_kinds.len(), 2);

        let unique_kinds: HashSet<_> = TemplateKind::all().collect();
        assert_eq!(unique_kinds.len(), 2);
        assert!(unique_kinds.contains(&TemplateKind::Golang));
        assert!(unique_kinds.contains(&TemplateKind::TypeScript));
    }

    #[test]
    fn test_value_enum_names() {
        let names: Vec<_> = TemplateKind::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["golang", "typescript"]);
    }
}
