use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::frontmatter;
use super::schema::{Post, Schema, SideProject, validate};
use crate::error::ContentError;

const EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<T> {
    pub slug: String,
    #[serde(flatten)]
    pub data: T,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl<T: Schema> Entry<T> {
    pub fn parse(slug: &str, source: &str) -> Result<Self, ContentError> {
        let (yaml, body) = frontmatter::split(source)?;
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        Ok(Entry {
            slug: slug.to_string(),
            data: validate(value)?,
            body: body.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<Entry<T>>,
}

impl<T: Schema> Collection<T> {
    pub fn from_entries(mut entries: Vec<Entry<T>>) -> Self {
        entries.sort_by(|a, b| a.data.compare(&b.data).then_with(|| a.slug.cmp(&b.slug)));
        Self { entries }
    }

    /// Loads every markdown entry of `dir`. Any invalid entry fails the whole
    /// load. A missing directory is an empty collection.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        if !dir.is_dir() {
            tracing::warn!(collection = T::SPEC.name, path = ?dir, "collection directory not found");
            return Ok(Self::from_entries(Vec::new()));
        }

        let read_dir = fs::read_dir(dir).map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_markdown(path))
            .collect();
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;
            let entry = Entry::<T>::parse(slug, &source).map_err(|e| e.in_entry(&path))?;
            entries.push(entry);
        }

        tracing::info!(collection = T::SPEC.name, entries = entries.len(), "loaded collection");
        Ok(Self::from_entries(entries))
    }

    pub fn get(&self, slug: &str) -> Option<&Entry<T>> {
        self.entries.iter().find(|e| e.slug == slug)
    }
}

impl<T> Collection<T> {
    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Both collections of the site, loaded from `<root>/blog` and
/// `<root>/side-projects`.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pub blog: Collection<Post>,
    pub side_projects: Collection<SideProject>,
}

impl ContentStore {
    pub fn load(root: &Path) -> Result<Self, ContentError> {
        Ok(Self {
            blog: Collection::load(&root.join(Post::SPEC.name))?,
            side_projects: Collection::load(&root.join(SideProject::SPEC.name))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\ndescription: About {title}\npublishedAt: {date}\n---\nBody of {title}\n")
    }

    #[test]
    fn test_load_sorts_posts_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let blog = tmp.path().join("blog");
        fs::create_dir(&blog).unwrap();
        write(&blog, "old.md", &post("Old", "2021-06-01"));
        write(&blog, "new.mdx", &post("New", "2024-02-10"));
        write(&blog, "notes.txt", "not content");

        let store = ContentStore::load(tmp.path()).unwrap();
        let slugs: Vec<&str> = store.blog.entries().iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
        assert!(store.side_projects.is_empty());

        let new = store.blog.get("new").unwrap();
        assert_eq!(new.data.published_at, Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(new.body, "Body of New\n");
        assert!(store.blog.get("missing").is_none());
    }

    #[test]
    fn test_load_sorts_side_projects_by_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("side-projects");
        fs::create_dir(&dir).unwrap();
        for (slug, order) in [("b", 2), ("a", 1), ("c", 3)] {
            write(
                &dir,
                &format!("{slug}.md"),
                &format!("---\ntitle: {slug}\ndescription: d\nrepo: r\nurl: u\norder: {order}\n---\n"),
            );
        }

        let projects = Collection::<SideProject>::load(&dir).unwrap();
        let orders: Vec<i64> = projects.entries().iter().map(|e| e.data.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_entry_fails_the_load() {
        let tmp = tempfile::tempdir().unwrap();
        let blog = tmp.path().join("blog");
        fs::create_dir(&blog).unwrap();
        write(&blog, "good.md", &post("Good", "2024-01-01"));
        write(&blog, "bad.md", "---\ntitle: Bad\n---\n");

        let err = ContentStore::load(tmp.path()).unwrap_err();
        match err {
            ContentError::Entry { path, source } => {
                assert!(path.ends_with("bad.md"));
                assert!(matches!(*source, ContentError::Schema { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = Entry::<Post>::parse("hello-world", &post("Hello", "2024-01-01")).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["slug"], "hello-world");
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["publishedAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("canonical").is_none());
    }
}
