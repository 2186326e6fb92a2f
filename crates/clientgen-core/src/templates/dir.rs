//! Resolution of template override directories.
//!
//! Embedded templates are always available; a template directory only
//! replaces individual templates by name. A directory is laid out as
//! `<root>/<kind>/<template>.tera`, mirroring the embedded names.

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable naming an override root
pub const TEMPLATE_DIR_ENV: &str = "CLIENTGEN_TEMPLATE_DIR";

/// Represents a template directory with resolved paths and validation
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Root directory containing one subdirectory per kind
    root_dir: PathBuf,
    /// Path to the specific template directory (root_dir/kind)
    template_path: PathBuf,
    /// The template kind (target language)
    kind: TemplateKind,
}

impl TemplateDir {
    /// Create a new TemplateDir with explicit paths
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }

    /// Resolve an explicitly requested override root; a missing directory is an error
    pub fn from_root(kind: TemplateKind, root: &Path) -> io::Result<Self> {
        if !root.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Template directory not found: {}", root.display()),
            ));
        }

        // accept either the root or the kind directory itself
        let template_path = if root.file_name().and_then(|n| n.to_str()) == Some(kind.as_str()) {
            root.to_path_buf()
        } else {
            root.join(kind.as_str())
        };

        if !template_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Template directory not found: {}", template_path.display()),
            ));
        }

        let root_dir = template_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());

        Ok(Self::new(root_dir, template_path, kind))
    }

    /// Discover an override directory for `kind`, if any standard location has one
    pub fn discover(kind: TemplateKind) -> Option<Self> {
        let root = Self::find_template_base_dir()?;
        let template_path = root.join(kind.as_str());
        if template_path.exists() {
            Some(Self::new(root, template_path, kind))
        } else {
            None
        }
    }

    /// Find the base template directory by checking standard locations
    fn find_template_base_dir() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check in the user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            let templates_dir = home_dir.join(".clientgen").join("templates");
            if templates_dir.exists() {
                return Some(templates_dir);
            }
        }

        None
    }

    /// Every `.tera` file below the kind directory, with the name it overrides
    pub fn template_files(&self) -> io::Result<Vec<(PathBuf, String)>> {
        fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    walk_dir(&path, files)?;
                } else if path.extension().and_then(|s| s.to_str()) == Some("tera") {
                    files.push(path);
                }
            }
            Ok(())
        }

        let mut files = Vec::new();
        walk_dir(&self.template_path, &mut files)?;
        files.sort();

        Ok(files
            .into_iter()
            .filter_map(|path| {
                let relative = path.strip_prefix(&self.root_dir).ok()?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                Some((path, name))
            })
            .collect())
    }

    /// Get the root directory containing the templates
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the template kind
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_template_dir_validation() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("templates/golang");
        fs::create_dir_all(&template_dir).unwrap();

        // Root or kind directory both resolve to the kind directory
        let from_root =
            TemplateDir::from_root(TemplateKind::Golang, &temp_dir.path().join("templates"))
                .unwrap();
        assert_eq!(from_root.template_path(), template_dir.as_path());
        let from_kind = TemplateDir::from_root(TemplateKind::Golang, &template_dir).unwrap();
        assert_eq!(from_kind.template_path(), template_dir.as_path());
        assert_eq!(from_kind.kind(), TemplateKind::Golang);

        // Missing kind directory
        let result =
            TemplateDir::from_root(TemplateKind::TypeScript, &temp_dir.path().join("templates"));
        assert!(result.is_err());

        // Non-existent root
        let result = TemplateDir::from_root(TemplateKind::Golang, Path::new("/nonexistent"));
        assert!(result.is_err());
    }

    #[test]
    fn test_template_files_named_like_embedded() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("golang");
        fs::create_dir_all(template_dir.join("static")).unwrap();
        fs::write(template_dir.join("op.archive.go.tera"), "x").unwrap();
        fs::write(template_dir.join("static/errors.go.tera"), "y").unwrap();
        fs::write(template_dir.join("README.md"), "ignored").unwrap();

        let dir = TemplateDir::from_root(TemplateKind::Golang, temp_dir.path()).unwrap();
        let names: Vec<_> = dir
            .template_files()
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();

        assert_eq!(
            names,
            vec!["golang/op.archive.go.tera", "golang/static/errors.go.tera"]
        );
    }
}
