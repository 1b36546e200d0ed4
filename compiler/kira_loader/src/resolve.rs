//! Path validation and the module path resolution algorithm (spec §4.2).

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::config::{parse_config, ProjectConfig};
use crate::error::LoadError;

/// Reject empty segments, `.`, `..`, and any segment containing a path
/// separator, before any resolution is attempted (spec: "rejected before
/// any I/O").
pub fn validate_path(dotted: &str, segments: &[&str]) -> Result<(), LoadError> {
    for segment in segments {
        if segment.is_empty() || *segment == "." || *segment == ".." || segment.contains('/') || segment.contains('\\') {
            return Err(LoadError::InvalidPath {
                path: dotted.to_string(),
                segment: (*segment).to_string(),
            });
        }
    }
    Ok(())
}

/// Everything the resolution algorithm needs about the enclosing project,
/// beyond the bare segments being resolved.
pub struct ResolveContext<'a> {
    pub project_root: &'a Path,
    pub root_config: Option<&'a ProjectConfig>,
    /// Package name → (package directory, its own config). Populated
    /// lazily the first time a package is entered (spec: "cached under the
    /// package name").
    pub package_cache: &'a mut FxHashMap<String, (PathBuf, ProjectConfig)>,
    pub search_dirs: &'a [PathBuf],
    pub cwd: &'a Path,
}

/// Try to load (or fetch from cache) the package config rooted at `dir`,
/// provided it actually names `expected_name`. Returns `None` if `dir` has
/// no `kira.toml`, the file doesn't parse, or its package name doesn't
/// match — any of which means "not a configured package" to the caller,
/// which then falls through to the next resolution strategy.
fn package_config_if_named<'a>(
    dir: &Path,
    expected_name: &str,
    cache: &'a mut FxHashMap<String, (PathBuf, ProjectConfig)>,
) -> Option<&'a ProjectConfig> {
    if let Some((root, _)) = cache.get(expected_name) {
        if root == dir {
            return cache.get(expected_name).map(|(_, c)| c);
        }
    }
    let config_path = dir.join("kira.toml");
    let content = std::fs::read_to_string(&config_path).ok()?;
    let config = parse_config(&content).ok()?;
    if config.package_name.as_deref() != Some(expected_name) {
        return None;
    }
    cache.insert(expected_name.to_string(), (dir.to_path_buf(), config));
    cache.get(expected_name).map(|(_, c)| c)
}

/// Join `base` with a dotted sequence of segments and append `.ki`, trying
/// both the file-module and directory-module (`mod.ki`) shapes. Pushes
/// every candidate onto `tried` so a failed resolution can report them.
fn probe_file_and_mod(base: &Path, rest: &[&str], tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in rest {
        path.push(segment);
    }
    let file = path.with_extension("ki");
    tried.push(file.clone());
    if file.is_file() {
        return Some(file);
    }
    let mod_file = path.join("mod.ki");
    tried.push(mod_file.clone());
    if mod_file.is_file() {
        return Some(mod_file);
    }
    None
}

/// Resolve a dotted module path to a `.ki` file, first-hit-wins across the
/// four strategies in spec §4.2. `segments` has already passed
/// [`validate_path`]. Returns every path actually probed on failure, so the
/// caller can build a [`LoadError::ModuleNotFound`] with search context.
pub fn resolve_module_path(segments: &[&str], ctx: &mut ResolveContext) -> Result<PathBuf, Vec<PathBuf>> {
    let mut tried = Vec::new();

    // 1. Package config recursion: the first segment names a package the
    //    root config maps to a directory that itself declares that package
    //    name in its own kira.toml.
    if let (Some(root_config), Some(&first)) = (ctx.root_config, segments.first()) {
        if let Some(mapped) = root_config.modules.get(first) {
            let package_dir = ctx.project_root.join(mapped);
            if package_dir.is_dir() {
                if let Some(pkg_config) = package_config_if_named(&package_dir, first, ctx.package_cache) {
                    let rest = &segments[1..];
                    if let Some(submodule) = rest.first().and_then(|&m| pkg_config.modules.get(m)) {
                        // Direct submodule mapping wins over the
                        // dotted-path-as-directory fallback below.
                        let target = package_dir.join(submodule);
                        let file = target.clone();
                        tried.push(file.clone());
                        if file.is_file() {
                            return Ok(file);
                        }
                        let mod_file = target.join("mod.ki");
                        tried.push(mod_file.clone());
                        if mod_file.is_file() {
                            return Ok(mod_file);
                        }
                    } else if let Some(found) = probe_file_and_mod(&package_dir, rest, &mut tried) {
                        return Ok(found);
                    }
                }
            }
        }
    }

    // 2. Direct project-config module mapping for the first segment.
    if let (Some(root_config), Some(&first)) = (ctx.root_config, segments.first()) {
        if let Some(mapped) = root_config.modules.get(first) {
            let base = ctx.project_root.join(mapped);
            let rest = &segments[1..];
            if rest.is_empty() {
                let file = base.with_extension("ki");
                tried.push(file.clone());
                if file.is_file() {
                    return Ok(file);
                }
                let mod_file = base.join("mod.ki");
                tried.push(mod_file.clone());
                if mod_file.is_file() {
                    return Ok(mod_file);
                }
            } else if let Some(found) = probe_file_and_mod(&base, rest, &mut tried) {
                return Ok(found);
            }
        }
    }

    // 3. Configured search directories, tried in order.
    for dir in ctx.search_dirs {
        if let Some(found) = probe_file_and_mod(dir, segments, &mut tried) {
            return Ok(found);
        }
    }

    // 4. Relative to the current working directory.
    if let Some(found) = probe_file_and_mod(ctx.cwd, segments, &mut tried) {
        return Ok(found);
    }

    Err(tried)
}

/// Walk up from `start` looking for a `kira.toml`, the way the reference
/// compiler walks up looking for `library/std/prelude.ori`. Returns the
/// directory containing it (the project root) and the parsed config.
pub fn discover_project_config(start: &Path) -> Result<Option<(PathBuf, ProjectConfig)>, LoadError> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join("kira.toml");
        if candidate.is_file() {
            let content = std::fs::read_to_string(&candidate).map_err(|e| LoadError::FileReadError {
                path: candidate.clone(),
                message: e.to_string(),
            })?;
            let config = parse_config(&content)?;
            return Ok(Some((d.to_path_buf(), config)));
        }
        dir = d.parent();
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_segment_is_rejected() {
        assert!(validate_path("a..b", &["a", "", "b"]).is_err());
    }

    #[test]
    fn trailing_dot_is_rejected() {
        assert!(validate_path("a.b.", &["a", "b", ""]).is_err());
    }

    #[test]
    fn leading_dot_is_rejected() {
        assert!(validate_path(".a", &["", "a"]).is_err());
    }

    #[test]
    fn parent_segment_is_rejected() {
        assert!(validate_path("../x", &["..", "x"]).is_err());
    }

    #[test]
    fn segment_with_slash_is_rejected() {
        assert!(validate_path("a/b", &["a/b"]).is_err());
    }

    #[test]
    fn ordinary_path_is_accepted() {
        assert!(validate_path("a.b.c", &["a", "b", "c"]).is_ok());
    }
}
