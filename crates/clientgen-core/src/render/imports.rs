//! Import collation.
//!
//! Builders record every module a body uses as it is assembled; the set
//! deduplicates and sorts, then prints the target's canonical import block.

use std::collections::{BTreeMap, BTreeSet};

/// Modules a generated file imports, with the symbols taken from each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    /// Named symbols per module; an empty set imports the module itself
    named: BTreeMap<String, BTreeSet<String>>,
    /// Default import (TypeScript) or package alias (Go) per module
    default: BTreeMap<String, String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a whole module
    pub fn add_module(&mut self, module: impl Into<String>) -> &mut Self {
        self.named.entry(module.into()).or_default();
        self
    }

    /// Import `symbol` from `module`
    pub fn add_named(&mut self, module: impl Into<String>, symbol: impl Into<String>) -> &mut Self {
        self.named
            .entry(module.into())
            .or_default()
            .insert(symbol.into());
        self
    }

    /// Import `module` under `name`: a default import or a package alias
    pub fn add_default(&mut self, module: impl Into<String>, name: impl Into<String>) -> &mut Self {
        let module = module.into();
        self.named.entry(module.clone()).or_default();
        self.default.insert(module, name.into());
        self
    }

    pub fn extend(&mut self, other: &ImportSet) {
        for (module, symbols) in &other.named {
            self.named
                .entry(module.clone())
                .or_default()
                .extend(symbols.iter().cloned());
        }
        for (module, name) in &other.default {
            self.default.insert(module.clone(), name.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.named.contains_key(module)
    }

    /// Sorted module names
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    pub fn symbols(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.named.get(module)
    }

    /// Grouped Go `import (...)` block, standard library first
    pub fn render_go(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let (stdlib, external): (Vec<&str>, Vec<&str>) =
            self.modules().partition(|module| is_go_stdlib(module));

        let mut out = String::from("import (\n");
        for (i, group) in [stdlib, external].iter().filter(|g| !g.is_empty()).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for module in group {
                match self.default.get(*module) {
                    Some(alias) => out.push_str(&format!("\t{} \"{}\"\n", alias, module)),
                    None => out.push_str(&format!("\t\"{}\"\n", module)),
                }
            }
        }
        out.push_str(")\n");
        out
    }

    /// One `import ... from '...';` line per module, sorted by module
    pub fn render_typescript(&self) -> String {
        let mut out = String::new();
        for (module, symbols) in &self.named {
            let default = self.default.get(module);
            let named = (!symbols.is_empty()).then(|| {
                format!(
                    "{{ {} }}",
                    symbols.iter().cloned().collect::<Vec<_>>().join(", ")
                )
            });

            let clause = match (default, named) {
                (Some(default), Some(named)) => format!("{}, {}", default, named),
                (Some(default), None) => default.clone(),
                (None, Some(named)) => named,
                (None, None) => {
                    out.push_str(&format!("import '{}';\n", module));
                    continue;
                }
            };
            out.push_str(&format!("import {} from '{}';\n", clause, module));
        }
        out
    }
}

/// Standard library packages have no dot in their first path element
fn is_go_stdlib(module: &str) -> bool {
    module
        .split('/')
        .next()
        .map_or(true, |first| !first.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_block_groups_stdlib_first() {
        let mut imports = ImportSet::new();
        imports
            .add_module("net/http")
            .add_module("github.com/example/backend/internal/lib/observability")
            .add_module("context")
            .add_default(
                "github.com/example/backend/internal/lib/search/text",
                "textsearch",
            )
            .add_module("context");

        assert_eq!(
            imports.render_go(),
            "import (\n\
             \t\"context\"\n\
             \t\"net/http\"\n\
             \n\
             \t\"github.com/example/backend/internal/lib/observability\"\n\
             \ttextsearch \"github.com/example/backend/internal/lib/search/text\"\n\
             )\n"
        );
    }

    #[test]
    fn test_go_block_without_external_group() {
        let mut imports = ImportSet::new();
        imports.add_module("testing");
        assert_eq!(imports.render_go(), "import (\n\t\"testing\"\n)\n");
        assert_eq!(ImportSet::new().render_go(), "");
    }

    #[test]
    fn test_typescript_lines() {
        let mut imports = ImportSet::new();
        imports
            .add_named("@api/models", "Recipe")
            .add_named("@api/models", "APIResponse")
            .add_named("@api/models", "Recipe")
            .add_default("axios", "axios")
            .add_named("axios", "AxiosInstance")
            .add_default("axios-mock-adapter", "AxiosMockAdapter")
            .add_module("./setup");

        assert_eq!(
            imports.render_typescript(),
            "import './setup';\n\
             import { APIResponse, Recipe } from '@api/models';\n\
             import axios, { AxiosInstance } from 'axios';\n\
             import AxiosMockAdapter from 'axios-mock-adapter';\n"
        );
    }

    #[test]
    fn test_extend_merges_symbols() {
        let mut a = ImportSet::new();
        a.add_named("@api/models", "Recipe");
        let mut b = ImportSet::new();
        b.add_named("@api/models", "Meal").add_module("context");

        a.extend(&b);
        let symbols: Vec<_> = a.symbols("@api/models").unwrap().iter().cloned().collect();
        assert_eq!(symbols, vec!["Meal", "Recipe"]);
        assert!(a.contains("context"));
    }
}
