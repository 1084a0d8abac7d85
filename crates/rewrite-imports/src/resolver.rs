//! Target path resolution
//!
//! Turns a [`TargetSpecifier`] into the specifier text written back into the
//! source. Relative targets are computed lexically, without touching the
//! filesystem, so targets that do not exist yet still resolve.

use crate::file::FileLocation;
use crate::options::{TargetPath, TargetSpecifier};
use path_clean::PathClean;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Resolve `target` for a reference found in the file at `location`
pub fn resolve<'t>(target: &'t TargetSpecifier, location: &FileLocation) -> Cow<'t, str> {
    match target {
        TargetSpecifier::Literal(path) => Cow::Borrowed(path),
        TargetSpecifier::Path(target) => match referencing_dir(target, location) {
            Some(from_dir) => {
                let to = location.cwd().join(&target.path).clean();
                Cow::Owned(relative_specifier(&from_dir, &to))
            }
            None => Cow::Borrowed(&target.path),
        },
    }
}

/// Directory the relative specifier is computed from, or `None` when the
/// target is used verbatim
fn referencing_dir(target: &TargetPath, location: &FileLocation) -> Option<PathBuf> {
    let file = match &target.relative_to {
        Some(root) => location.cwd().join(root).join(location.relative()),
        None if target.relative => location.path(),
        None => return None,
    };
    let file = file.clean();

    if location.is_directory() {
        return Some(file);
    }
    Some(file.parent().map(Path::to_path_buf).unwrap_or(file))
}

/// Relative module specifier from `from_dir` to `to`, always using `/`
pub fn relative_specifier(from_dir: &Path, to: &Path) -> String {
    let relative = pathdiff::diff_paths(to, from_dir).unwrap_or_else(|| to.to_path_buf());
    let specifier = relative.to_string_lossy().replace('\\', "/");

    if specifier.is_empty() {
        return "./".to_string();
    }
    if specifier == ".."
        || specifier.starts_with("../")
        || specifier.starts_with("./")
        || specifier.starts_with('/')
    {
        specifier
    } else {
        format!("./{}", specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn location(path: &str) -> FileLocation {
        FileLocation::new(path).with_cwd("/abs").with_base("/abs")
    }

    #[test]
    fn test_literal_is_verbatim() {
        let target = TargetSpecifier::literal("somewhere");
        assert_eq!(resolve(&target, &location("/abs/sub/file.js")), "somewhere");
    }

    #[test]
    fn test_path_without_relative_flag_is_verbatim() {
        let target = TargetSpecifier::path("../lib/x.js");
        assert_eq!(resolve(&target, &location("/abs/sub/file.js")), "../lib/x.js");
    }

    #[test]
    fn test_relative_to_base_directory() {
        let target = TargetSpecifier::path("/abs/target.js").relative_to("/abs/");
        assert_eq!(
            resolve(&target, &location("/abs/sub/file.js")),
            "../target.js"
        );
    }

    #[test]
    fn test_relative_to_output_root() {
        // Sources live under /abs/src, build output goes to /abs/dist
        let file = FileLocation::new("/abs/src/deep/file.js")
            .with_cwd("/abs")
            .with_base("/abs/src");
        let target = TargetSpecifier::path("dist/vendor/lib.js").relative_to("dist");
        assert_eq!(resolve(&target, &file), "../vendor/lib.js");
    }

    #[test]
    fn test_relative_flag_uses_file_directory() {
        let target = TargetSpecifier::path("lib/util.js").relative();
        assert_eq!(
            resolve(&target, &location("/abs/lib/nested/file.js")),
            "../util.js"
        );
    }

    #[test]
    fn test_same_directory_gets_dot_prefix() {
        let target = TargetSpecifier::path("/abs/sub/sibling.js").relative();
        assert_eq!(
            resolve(&target, &location("/abs/sub/file.js")),
            "./sibling.js"
        );
    }

    #[test]
    fn test_directory_location_is_its_own_base() {
        let dir = location("/abs/sub").into_directory();
        let target = TargetSpecifier::path("/abs/sub/x/y.js").relative();
        assert_eq!(resolve(&target, &dir), "./x/y.js");
    }

    #[test]
    fn test_dot_segments_are_cleaned() {
        let file = FileLocation::new("/abs/src/./deep/../file.js")
            .with_cwd("/abs")
            .with_base("/abs");
        let target = TargetSpecifier::path("lib/./vendor/../util.js").relative();
        assert_eq!(resolve(&target, &file), "../lib/util.js");
    }

    #[test]
    fn test_relative_specifier_prefixes() {
        let from = Path::new("/abs/sub");
        assert_eq!(relative_specifier(from, Path::new("/abs/sub")), "./");
        assert_eq!(relative_specifier(from, Path::new("/abs")), "..");
        assert_eq!(relative_specifier(from, Path::new("/abs/sub/a.js")), "./a.js");
        assert_eq!(relative_specifier(from, Path::new("/abs/b/c.js")), "../b/c.js");
    }
}
