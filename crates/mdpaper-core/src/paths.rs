//! Filename sanitization, collision-free paths and note discovery.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{CoreError, Result};

/// Fallback file stem when a title sanitizes to nothing.
pub const DEFAULT_STEM: &str = "paper";

fn is_invalid_filename_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\'')
        || c == '\u{7f}'
        || ('\u{0}'..='\u{1f}').contains(&c)
}

/// Turn a paper title into a safe file stem.
///
/// Whitespace runs become `_`, filesystem-invalid characters become `_`, and
/// trailing `_`/`.` are trimmed.
pub fn sanitize_title_for_filename(title: &str) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    let replaced: String = joined
        .chars()
        .map(|c| if is_invalid_filename_char(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_end_matches(['_', '.']);
    if trimmed.trim_matches('_').is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn pdf_filename_for_title(title: &str) -> String {
    format!("{}.pdf", sanitize_title_for_filename(title))
}

/// `path` if free, otherwise the first free `{stem}_{n}{.ext}` for n = 1, 2, …
pub fn ensure_unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = parent.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Whether `name` is `base` itself or one of the `{stem}_{n}{.ext}` names
/// [`ensure_unique_path`] hands out for it.
pub fn is_numbered_variant(name: &str, base: &str) -> bool {
    if name == base {
        return true;
    }
    let base_path = Path::new(base);
    let (Some(stem), ext) = (
        base_path.file_stem().and_then(|s| s.to_str()),
        base_path.extension().and_then(|e| e.to_str()),
    ) else {
        return false;
    };
    let rest = match name.strip_prefix(stem).and_then(|r| r.strip_prefix('_')) {
        Some(rest) => rest,
        None => return false,
    };
    let counter = match ext {
        Some(ext) => rest.strip_suffix(ext).and_then(|r| r.strip_suffix('.')),
        None => Some(rest),
    };
    counter.is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Fails unless `path` is an existing directory.
pub fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "not a directory: {}",
            path.display()
        )))
    }
}

/// Fails when `path` is a directory; a missing path is fine.
pub fn require_file_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        Err(CoreError::Validation(format!(
            "expected a file, found a directory: {}",
            path.display()
        )))
    } else {
        Ok(())
    }
}

/// Lexical path of `target` relative to `base_dir`, joined with `/`.
///
/// Both paths are made absolute against the current directory first.
pub fn relative_path(target: &Path, base_dir: &Path) -> Result<String> {
    let target = normalize(&std::path::absolute(target)?);
    let base = normalize(&std::path::absolute(base_dir)?);

    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(base_parts[common..].iter().map(|_| "..".to_string()));
    parts.extend(
        target_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Recursively collect note files whose extension matches one of `extensions`
/// (case-insensitive), sorted by path.
pub fn collect_note_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut notes = Vec::new();
    if !dir.is_dir() {
        return Ok(notes);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            notes.extend(collect_note_files(&path, extensions)?);
        } else if path.is_file() && has_extension(&path, extensions) {
            notes.push(path);
        }
    }

    notes.sort();
    Ok(notes)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(&ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_invalid_characters() {
        let name = sanitize_title_for_filename("A: B/C");
        assert_eq!(name, "A__B_C");
        assert!(!name.chars().any(is_invalid_filename_char));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(
            sanitize_title_for_filename("  Attention   is\tall you need "),
            "Attention_is_all_you_need"
        );
    }

    #[test]
    fn sanitize_trims_trailing_invalid() {
        assert_eq!(sanitize_title_for_filename("What is it?"), "What_is_it");
        assert_eq!(sanitize_title_for_filename("Ends with dot."), "Ends_with_dot");
    }

    #[test]
    fn sanitize_falls_back_to_paper() {
        assert_eq!(sanitize_title_for_filename(""), "paper");
        assert_eq!(sanitize_title_for_filename("   "), "paper");
        assert_eq!(sanitize_title_for_filename("<>:?*"), "paper");
    }

    #[test]
    fn pdf_filename_appends_extension() {
        assert_eq!(pdf_filename_for_title("Deep learning"), "Deep_learning.pdf");
    }

    #[test]
    fn unique_path_returns_free_path_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.pdf");
        assert_eq!(ensure_unique_path(&path), path);
    }

    #[test]
    fn unique_path_counts_up_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.pdf");
        let mut produced = Vec::new();
        for _ in 0..3 {
            let p = ensure_unique_path(&path);
            assert!(!p.exists());
            fs::write(&p, b"x").unwrap();
            produced.push(p.file_name().unwrap().to_string_lossy().to_string());
        }
        assert_eq!(produced, vec!["a.pdf", "a_1.pdf", "a_2.pdf"]);
    }

    #[test]
    fn numbered_variants_of_a_name() {
        assert!(is_numbered_variant("Same_Title.pdf", "Same_Title.pdf"));
        assert!(is_numbered_variant("Same_Title_1.pdf", "Same_Title.pdf"));
        assert!(is_numbered_variant("Same_Title_12.pdf", "Same_Title.pdf"));
        assert!(!is_numbered_variant("Same_Title_.pdf", "Same_Title.pdf"));
        assert!(!is_numbered_variant("Same_Title_x.pdf", "Same_Title.pdf"));
        assert!(!is_numbered_variant("Same_Title_1.txt", "Same_Title.pdf"));
        assert!(!is_numbered_variant("Other_1.pdf", "Same_Title.pdf"));
    }

    #[test]
    fn numbered_variants_are_what_unique_path_produces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.pdf");
        for _ in 0..3 {
            let p = ensure_unique_path(&path);
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            assert!(is_numbered_variant(&name, "a.pdf"));
            fs::write(&p, b"x").unwrap();
        }
    }

    #[test]
    fn path_validation() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("note.md");
        assert!(require_dir(dir.path()).is_ok());
        assert!(matches!(require_dir(&file), Err(CoreError::Validation(_))));
        assert!(require_file_path(&file).is_ok());
        assert!(matches!(
            require_file_path(dir.path()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn relative_path_between_siblings() {
        let rel = relative_path(Path::new("/lib/pdfs/A.pdf"), Path::new("/lib/notes")).unwrap();
        assert_eq!(rel, "../pdfs/A.pdf");
    }

    #[test]
    fn relative_path_below_base() {
        let rel = relative_path(Path::new("/lib/notes/pdfs/A.pdf"), Path::new("/lib/notes")).unwrap();
        assert_eq!(rel, "pdfs/A.pdf");
        let rel = relative_path(Path::new("/lib/notes/./pdfs/../A.pdf"), Path::new("/lib/notes")).unwrap();
        assert_eq!(rel, "A.pdf");
    }

    #[test]
    fn collects_markdown_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("sub").join("a.MARKDOWN"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::write(dir.path().join("readme.cmd"), "").unwrap();

        let exts = vec!["md".to_string(), "markdown".to_string()];
        let found = collect_note_files(dir.path(), &exts).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b.md", "a.MARKDOWN"]);
    }
}
