//! Context types for rule execution.

use crate::types::Location;
use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
///
/// Carries the paths a rule needs to resolve relative links and to
/// report locations relative to the project root.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as discovered.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Project root used for root-relative links.
    pub root: &'a Path,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    line_starts: Vec<usize>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &'a Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            path,
            content,
            root,
            relative_path,
            line_starts,
        }
    }

    /// Directory containing the file, used to resolve relative links.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(self.root)
    }

    /// Calculates byte offset for a given line and column.
    ///
    /// Both are 1-indexed. Out of range lines clamp to the end of the file.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }
        match self.line_starts.get(line - 1) {
            Some(start) => (start + column.saturating_sub(1)).min(self.content.len()),
            None => self.content.len(),
        }
    }

    /// Builds a location in this file with the miette span filled in.
    #[must_use]
    pub fn location(&self, line: usize, column: usize, length: usize) -> Location {
        Location::new(self.relative_path.clone(), line, column)
            .with_span(self.offset_for(line, column), length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let ctx = FileContext::new(
            Path::new("/project/docs/guide.md"),
            "",
            Path::new("/project"),
        );
        assert_eq!(ctx.relative_path, PathBuf::from("docs/guide.md"));
        assert_eq!(ctx.directory(), Path::new("/project/docs"));
    }

    #[test]
    fn test_offset_calculation() {
        let content = "line1\nline2\r\nline3";
        let ctx = FileContext::new(Path::new("test.md"), content, Path::new("."));

        assert_eq!(ctx.offset_for(1, 1), 0);
        assert_eq!(ctx.offset_for(2, 1), 6);
        assert_eq!(ctx.offset_for(2, 3), 8);
        assert_eq!(ctx.offset_for(3, 1), 13);
        assert_eq!(ctx.offset_for(9, 1), content.len());
    }

    #[test]
    fn test_location_has_span() {
        let ctx = FileContext::new(Path::new("a.md"), "one\ntwo", Path::new("."));
        let location = ctx.location(2, 2, 2);
        assert_eq!(location.offset, 5);
        assert_eq!(location.length, 2);
        assert_eq!(location.file, PathBuf::from("a.md"));
    }
}
