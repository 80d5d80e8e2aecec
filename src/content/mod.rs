//! Content Module
//!
//! Typed content collections for the site. Every entry is a markdown file
//! whose frontmatter is validated against the collection schema when the
//! collection is loaded; bodies are kept verbatim.
//!
//! # Collections
//!
//! - `blog` - posts ([`Post`]), newest first
//! - `side-projects` - side projects ([`SideProject`]), by display order
//!
//! # Usage
//!
//! ```rust,ignore
//! use folio::content::ContentStore;
//!
//! let store = ContentStore::load(Path::new("src/content"))?;
//! for entry in store.blog.entries() {
//!     println!("{} {}", entry.slug, entry.data.title);
//! }
//! ```

mod collection;
pub mod frontmatter;
mod schema;

pub use collection::{Collection, ContentStore, Entry};
pub use schema::{
    CollectionSpec, DateInput, FieldKind, FieldSpec, Post, Schema, SideProject, parse_date, validate,
};
