//! Guards against overwriting an input with the merged catalog.
//!
//! The harvested content index and the feed snapshot are slow to rebuild, and
//! both are JSON files sitting next to the output. A mistyped `--output` must
//! fail before anything is written.

use anyhow::{bail, Result};
use std::path::Path;

/// File-name fragments of the linker's inputs.
pub static SOURCE_PATTERNS: &[&str] = &["songName2folderId", "zetaraku", "community-names"];

/// Validates that `output` may be replaced with the merged catalog.
///
/// - the extension must be `required_extension`
/// - `output` must not be one of `source_paths`
/// - the file name must not look like one of the inputs
pub fn validate_output_path(
    output: &Path,
    required_extension: &str,
    source_paths: &[&Path],
) -> Result<()> {
    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if output_name.is_empty() {
        bail!(
            "Safety check failed: output '{}' has no file name",
            output.display()
        );
    }

    let extension = output.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !extension.eq_ignore_ascii_case(required_extension) {
        bail!(
            "Safety check failed: output file '{}' must have a .{} extension",
            output.display(),
            required_extension
        );
    }

    for source in source_paths {
        if output == *source || same_file(output, source) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    for pattern in SOURCE_PATTERNS {
        if output_name.contains(pattern) {
            bail!(
                "Safety check failed: output '{}' matches input file pattern '{}'",
                output.display(),
                pattern
            );
        }
    }

    Ok(())
}

/// Both paths exist and resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
