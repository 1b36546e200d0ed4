//! `kira.toml` project configuration (spec §6).
//!
//! The spec's grammar is a "minimal TOML subset" — section headers, `#`
//! comments, and `key = "string"`/`key = 'string'` pairs. That subset is a
//! subset of what the real `toml` crate accepts, so we parse with `toml`
//! and then validate the shape ourselves rather than hand-rolling a
//! scanner for a grammar the real parser already accepts (see
//! `SPEC_FULL.md` §1).

use rustc_hash::FxHashMap;

use crate::error::LoadError;

/// A parsed `kira.toml`: the `[package]` and `[modules]` sections. Any other
/// section is silently ignored, per spec.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    pub package_name: Option<String>,
    /// `modname = "relative/path"` entries, in the order the `toml` crate's
    /// underlying map yields them (tests should not depend on ordering).
    pub modules: FxHashMap<String, String>,
}

/// Parse a `kira.toml`'s contents.
///
/// A file that isn't valid TOML, or whose recognized sections don't match
/// the documented shape (non-string values in `[modules]`, a `[package]`
/// with a non-string `name`), is reported as [`LoadError::ConfigError`] —
/// the project config is unusable in either case, the same way an
/// unreadable file is.
pub fn parse_config(content: &str) -> Result<ProjectConfig, LoadError> {
    let value: toml::Value = content
        .parse()
        .map_err(|e: toml::de::Error| LoadError::ConfigError(e.to_string()))?;
    let table = value
        .as_table()
        .ok_or_else(|| LoadError::ConfigError("kira.toml must be a table".to_string()))?;

    let package_name = match table.get("package") {
        Some(toml::Value::Table(package)) => match package.get("name") {
            Some(toml::Value::String(name)) => Some(name.clone()),
            Some(_) => return Err(LoadError::ConfigError("[package].name must be a string".to_string())),
            None => None,
        },
        Some(_) => return Err(LoadError::ConfigError("[package] must be a table".to_string())),
        None => None,
    };

    let mut modules = FxHashMap::default();
    if let Some(section) = table.get("modules") {
        let section = section
            .as_table()
            .ok_or_else(|| LoadError::ConfigError("[modules] must be a table".to_string()))?;
        for (key, value) in section {
            let path = value
                .as_str()
                .ok_or_else(|| LoadError::ConfigError(format!("[modules].{key} must be a string")))?;
            modules.insert(key.clone(), path.to_string());
        }
    }
    // Every other section ([dependencies], [build], whatever a future
    // driver wants) is silently ignored, per spec.

    Ok(ProjectConfig { package_name, modules })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_with_only_package_name() {
        let config = parse_config("[package]\nname = \"demo\"\n").unwrap();
        assert_eq!(config.package_name.as_deref(), Some("demo"));
        assert!(config.modules.is_empty());
    }

    #[test]
    fn modules_section_is_collected() {
        let config = parse_config(
            r#"
            [package]
            name = "demo"

            [modules]
            foo = "src/foo.ki"
            bar = "pkg/"
            "#,
        )
        .unwrap();
        assert_eq!(config.modules.get("foo").map(String::as_str), Some("src/foo.ki"));
        assert_eq!(config.modules.get("bar").map(String::as_str), Some("pkg/"));
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let config = parse_config("[package]\nname = \"demo\"\n\n[dependencies]\nsomething = \"1.0\"\n").unwrap();
        assert_eq!(config.package_name.as_deref(), Some("demo"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let config = parse_config("# a comment\n\n[package]\nname = \"demo\" # trailing comment\n").unwrap();
        assert_eq!(config.package_name.as_deref(), Some("demo"));
    }

    #[test]
    fn non_string_module_entry_is_a_config_error() {
        let err = parse_config("[modules]\nfoo = 1\n").unwrap_err();
        assert!(matches!(err, LoadError::ConfigError(_)));
    }

    #[test]
    fn config_with_no_sections_at_all_is_fine() {
        let config = parse_config("").unwrap();
        assert!(config.package_name.is_none());
        assert!(config.modules.is_empty());
    }
}
