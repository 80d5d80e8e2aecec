use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no frontmatter block")]
    MissingFrontmatter,
    #[error("unterminated frontmatter block")]
    UnterminatedFrontmatter,
    #[error("invalid frontmatter yaml")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter must be a mapping")]
    NotAMapping,
    #[error("schema violation in {collection}: {}", .violations.join(", "))]
    Schema {
        collection: &'static str,
        violations: Vec<String>,
    },
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid entry {path:?}")]
    Entry {
        path: PathBuf,
        #[source]
        source: Box<ContentError>,
    },
}

impl ContentError {
    pub fn in_entry(self, path: impl Into<PathBuf>) -> Self {
        ContentError::Entry {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write preferences")]
    Io(#[from] std::io::Error),
    #[error("failed to encode preferences")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("no canvas element: selector is empty")]
    MissingCanvas,
    #[error("canvas {selector} has zero size ({width}x{height})")]
    EmptyCanvas {
        selector: String,
        width: f64,
        height: f64,
    },
}
