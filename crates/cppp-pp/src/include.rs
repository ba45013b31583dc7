//! `#include` resolution (spec §4.4), plus the `#pragma once` extension
//! (SPEC_FULL.md §9: resolved Open Question, keyed on the resolver's
//! canonical path so it works the same whether the resolver is backed by a
//! real filesystem or an in-memory test double).

use std::path::{Path, PathBuf};

use cppp_lex::HeaderKind;
use rustc_hash::FxHashSet;

use crate::error::IncludeError;

/// Abstracts "where do I find the text for this header name" so the core
/// never touches `std::fs` directly — the out-of-scope outer driver is
/// free to supply its own resolver (virtual filesystem, in-memory test
/// fixtures, a build system's header map).
pub trait IncludeResolver {
    /// Resolve `name` (the text between the quotes/angles, not including
    /// them) to a canonical path and its contents.
    ///
    /// `from` is the including file's own resolved path, used to implement
    /// quote-form's "search the including file's directory first" rule;
    /// it's `None` for the initial translation unit.
    fn resolve(
        &self,
        name: &str,
        kind: HeaderKind,
        from: Option<&Path>,
    ) -> Result<(PathBuf, String), IncludeError>;
}

/// The default resolver: quote form searches the including file's
/// directory first, then both search lists in order; angle form searches
/// only the angle-bracket list.
pub struct FsIncludeResolver {
    quote_dirs: Vec<PathBuf>,
    angle_dirs: Vec<PathBuf>,
}

impl FsIncludeResolver {
    pub fn new(quote_dirs: Vec<PathBuf>, angle_dirs: Vec<PathBuf>) -> Self {
        Self {
            quote_dirs,
            angle_dirs,
        }
    }

    fn try_dir(dir: &Path, name: &str) -> Option<(PathBuf, String)> {
        let candidate = dir.join(name);
        std::fs::read_to_string(&candidate)
            .ok()
            .map(|text| (candidate, text))
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn resolve(
        &self,
        name: &str,
        kind: HeaderKind,
        from: Option<&Path>,
    ) -> Result<(PathBuf, String), IncludeError> {
        if kind == HeaderKind::Quoted {
            if let Some(from) = from {
                if let Some(dir) = from.parent() {
                    if let Some(found) = Self::try_dir(dir, name) {
                        return Ok(found);
                    }
                }
            }
            for dir in &self.quote_dirs {
                if let Some(found) = Self::try_dir(dir, name) {
                    return Ok(found);
                }
            }
        }
        for dir in &self.angle_dirs {
            if let Some(found) = Self::try_dir(dir, name) {
                return Ok(found);
            }
        }
        Err(IncludeError::NotFound(name.to_string()))
    }
}

/// Tracks which resolved paths have already been consumed under
/// `#pragma once`, so a second `#include` of the same file becomes a no-op
/// rather than a re-read.
#[derive(Default)]
pub struct PragmaOnceTracker {
    seen: FxHashSet<PathBuf>,
}

impl PragmaOnceTracker {
    pub fn new() -> Self {
        Self {
            seen: FxHashSet::default(),
        }
    }

    pub fn mark(&mut self, path: &Path) {
        self.seen.insert(path.to_path_buf());
    }

    pub fn already_included(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_form_prefers_including_files_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("local.h"), "SUB\n").unwrap();
        std::fs::write(dir.path().join("local.h"), "TOP\n").unwrap();

        let resolver = FsIncludeResolver::new(vec![dir.path().to_path_buf()], vec![]);
        let including = sub.join("main.c");
        let (_, text) = resolver
            .resolve("local.h", HeaderKind::Quoted, Some(&including))
            .unwrap();
        assert_eq!(text, "SUB\n");
    }

    #[test]
    fn quote_form_falls_back_to_search_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shared.h"), "SHARED\n").unwrap();

        let resolver = FsIncludeResolver::new(vec![dir.path().to_path_buf()], vec![]);
        let (_, text) = resolver
            .resolve("shared.h", HeaderKind::Quoted, None)
            .unwrap();
        assert_eq!(text, "SHARED\n");
    }

    #[test]
    fn angle_form_ignores_quote_dirs() {
        let quote_dir = tempfile::tempdir().unwrap();
        let angle_dir = tempfile::tempdir().unwrap();
        std::fs::write(quote_dir.path().join("x.h"), "QUOTE\n").unwrap();
        std::fs::write(angle_dir.path().join("x.h"), "ANGLE\n").unwrap();

        let resolver = FsIncludeResolver::new(
            vec![quote_dir.path().to_path_buf()],
            vec![angle_dir.path().to_path_buf()],
        );
        let (_, text) = resolver.resolve("x.h", HeaderKind::Angled, None).unwrap();
        assert_eq!(text, "ANGLE\n");
    }

    #[test]
    fn missing_header_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FsIncludeResolver::new(vec![dir.path().to_path_buf()], vec![]);
        let err = resolver
            .resolve("missing.h", HeaderKind::Angled, None)
            .unwrap_err();
        assert_eq!(err, IncludeError::NotFound("missing.h".to_string()));
    }

    #[test]
    fn pragma_once_tracker_remembers_paths() {
        let mut tracker = PragmaOnceTracker::new();
        let path = PathBuf::from("/tmp/a.h");
        assert!(!tracker.already_included(&path));
        tracker.mark(&path);
        assert!(tracker.already_included(&path));
    }
}
