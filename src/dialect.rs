use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use tree_sitter::Language;

/// Which syntax family a source unit is parsed as.
///
/// Both dialects accept JSX, class fields, optional chaining, nullish coalescing,
/// object rest/spread and decorators. `TypedSuperset` additionally accepts type syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Dialect {
    /// JavaScript (+ JSX).
    #[default]
    #[value(alias = "js", alias = "javascript")]
    Script,
    /// TypeScript (+ JSX).
    #[value(name = "typed", alias = "ts", alias = "typescript")]
    TypedSuperset,
}

impl Dialect {
    /// `.ts` / `.tsx` are typed; every other extension is parsed as plain script.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "ts" | "tsx" => Dialect::TypedSuperset,
            _ => Dialect::Script,
        }
    }

    /// Map an editor language id (`typescript`, `typescriptreact`, `javascript`, ...).
    pub fn from_language_id(id: &str) -> Self {
        if id.to_lowercase().contains("typescript") {
            Dialect::TypedSuperset
        } else {
            Dialect::Script
        }
    }

    pub fn language(self) -> Language {
        match self {
            Dialect::Script => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypedSuperset => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Script => "script",
            Dialect::TypedSuperset => "typed",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "script" | "js" | "javascript" => Ok(Dialect::Script),
            "typed" | "ts" | "typescript" => Ok(Dialect::TypedSuperset),
            other => Err(format!("unknown dialect '{other}' (expected script or typed)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(Dialect::from_path(Path::new("a/b.ts")), Dialect::TypedSuperset);
        assert_eq!(Dialect::from_path(Path::new("App.TSX")), Dialect::TypedSuperset);
        assert_eq!(Dialect::from_path(Path::new("index.js")), Dialect::Script);
        assert_eq!(Dialect::from_path(Path::new("view.jsx")), Dialect::Script);
        assert_eq!(Dialect::from_path(Path::new("Makefile")), Dialect::Script);
    }

    #[test]
    fn language_id_mapping() {
        assert_eq!(Dialect::from_language_id("typescriptreact"), Dialect::TypedSuperset);
        assert_eq!(Dialect::from_language_id("typescript"), Dialect::TypedSuperset);
        assert_eq!(Dialect::from_language_id("javascriptreact"), Dialect::Script);
    }

    #[test]
    fn parse_names() {
        assert_eq!("ts".parse::<Dialect>().unwrap(), Dialect::TypedSuperset);
        assert_eq!("JavaScript".parse::<Dialect>().unwrap(), Dialect::Script);
        assert!("python".parse::<Dialect>().is_err());
        assert_eq!(Dialect::TypedSuperset.to_string(), "typed");
    }
}
