pub const HOME: &str = "/";
pub const BLOG: &str = "/blog";
pub const SIDE_PROJECTS: &str = "/side-projects";
pub const ABOUT: &str = "/about";

/// Path of a file served from the public folder.
pub fn public(path: &str) -> String {
    format!("/{}", path)
}

/// Path of a single blog post. The slug is used verbatim, callers must pass
/// an already path-safe value.
pub fn blog_post(slug: &str) -> String {
    format!("{}/{}", BLOG, slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_post() {
        assert_eq!(blog_post("hello-world"), "/blog/hello-world");
        assert_eq!(blog_post("a b"), "/blog/a b");
    }

    #[test]
    fn test_public() {
        assert_eq!(public("foo"), "/foo");
        assert_eq!(public("images/cover.png"), "/images/cover.png");
        assert_eq!(public(""), "/");
    }
}
