use crate::error::ContentError;

const FENCE: &str = "---";

/// Splits a markdown document into its YAML frontmatter and body. The
/// document must open with a `---` line and the block ends at the next line
/// that is exactly `---`. The body is returned untouched.
pub fn split(source: &str) -> Result<(&str, &str), ContentError> {
    let source = source.trim_start_matches('\u{feff}');
    let rest = source
        .strip_prefix(FENCE)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
        .ok_or(ContentError::MissingFrontmatter)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(ContentError::UnterminatedFrontmatter)
}
