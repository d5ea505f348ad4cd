//! Static file serving module
//!
//! Resolves request paths inside the public root, loads the bytes, and builds
//! responses. Containment in the root is checked both lexically and after
//! canonicalization, so `..` segments, absolute forms and symlinks pointing
//! elsewhere are all refused.

use crate::config::SiteConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Content type of the entry document, whatever its extension
const INDEX_CONTENT_TYPE: &str = "text/html";

/// Why a static path produced no content
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// Missing, a directory, unreadable, or not decodable
    #[error("not found")]
    NotFound,
    /// Resolved outside the public root
    #[error("path escapes the public root")]
    Forbidden,
}

/// A file loaded from the public root
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub content: Bytes,
    pub content_type: &'static str,
}

/// Serve the entry document for `/`
pub async fn serve_index(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    match fs::read(site.index_path()).await {
        Ok(content) => build_static_response(ctx, Bytes::from(content), INDEX_CONTENT_TYPE),
        Err(e) => {
            logger::log_warning(&format!(
                "Entry document '{}' unavailable: {e}",
                site.index_path().display()
            ));
            http::build_404_response()
        }
    }
}

/// Serve any other path under the public root
pub async fn serve_path(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let requested = ctx.path.strip_prefix('/').unwrap_or(ctx.path);

    match resolve(&site.public_dir, requested).await {
        Ok(file) => build_static_response(ctx, file.content, file.content_type),
        Err(ResolveError::Forbidden) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
            http::build_403_response()
        }
        Err(ResolveError::NotFound) => http::build_404_response(),
    }
}

/// Resolve `requested` (percent-encoded, relative to `root`) to a file.
///
/// Only the root itself and paths beneath it are accepted. Any read failure
/// is reported as `NotFound` without distinguishing the reason.
pub async fn resolve(root: &Path, requested: &str) -> Result<StaticFile, ResolveError> {
    let decoded = percent_decode_str(requested)
        .decode_utf8()
        .map_err(|_| ResolveError::NotFound)?;

    let joined = contained_join(root, &decoded).ok_or(ResolveError::Forbidden)?;

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Public directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return Err(ResolveError::NotFound);
        }
    };

    // File not found is common (404), no need to log
    let Ok(file_canonical) = fs::canonicalize(&joined).await else {
        return Err(ResolveError::NotFound);
    };
    if !file_canonical.starts_with(&root_canonical) {
        return Err(ResolveError::Forbidden);
    }

    let content = fs::read(&file_canonical)
        .await
        .map_err(|_| ResolveError::NotFound)?;

    // Type follows the name that was asked for, not a symlink target
    let content_type = mime::get_content_type(joined.extension().and_then(|e| e.to_str()));

    Ok(StaticFile {
        content: Bytes::from(content),
        content_type,
    })
}

/// Join `relative` onto `root` without touching the filesystem.
///
/// Returns `None` for absolute forms and for `..` climbing above the root.
fn contained_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth.checked_sub(1)?;
                joined.pop();
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(joined)
}

fn build_static_response(
    ctx: &RequestContext<'_>,
    content: Bytes,
    content_type: &str,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    http::build_file_response(content, content_type, &etag, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs as stdfs;
    use tempfile::TempDir;

    /// Layout: <tmp>/public/{index.html, app.js, css/site.css, Logo.PNG, notes.md},
    /// <tmp>/secret.txt, <tmp>/public-evil/leak.html
    fn fixture() -> (TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let public = tmp.path().join("public");
        stdfs::create_dir_all(public.join("css")).unwrap();
        stdfs::write(public.join("index.html"), "<h1>home</h1>").unwrap();
        stdfs::write(public.join("app.js"), "console.log(1)").unwrap();
        stdfs::write(public.join("css/site.css"), "body{}").unwrap();
        stdfs::write(public.join("Logo.PNG"), [0x89, b'P', b'N', b'G']).unwrap();
        stdfs::write(public.join("notes.md"), "# notes").unwrap();
        stdfs::write(tmp.path().join("secret.txt"), "top secret").unwrap();
        stdfs::create_dir_all(tmp.path().join("public-evil")).unwrap();
        stdfs::write(tmp.path().join("public-evil/leak.html"), "leak").unwrap();
        (tmp, public)
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
        }
    }

    fn site(public: &Path) -> SiteConfig {
        SiteConfig {
            public_dir: public.to_path_buf(),
            index_file: "index.html".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_inside_root() {
        let (_tmp, public) = fixture();

        let file = resolve(&public, "css/site.css").await.unwrap();
        assert_eq!(&file.content[..], b"body{}");
        assert_eq!(file.content_type, "text/css");

        let file = resolve(&public, "app.js").await.unwrap();
        assert_eq!(file.content_type, "application/javascript");

        let file = resolve(&public, "Logo.PNG").await.unwrap();
        assert_eq!(file.content_type, "image/png");

        let file = resolve(&public, "notes.md").await.unwrap();
        assert_eq!(file.content_type, "text/plain");

        // Harmless dot segments stay inside
        let file = resolve(&public, "css/../index.html").await.unwrap();
        assert_eq!(&file.content[..], b"<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let (_tmp, public) = fixture();
        let attempts = [
            "../secret.txt",
            "css/../../secret.txt",
            "%2e%2e/secret.txt",
            "%2E%2E%2Fsecret.txt",
            "..%2fsecret.txt",
            "../public-evil/leak.html",
            "../does-not-exist",
            "/etc/passwd",
            "%2Fetc%2Fpasswd",
            "..",
        ];

        for attempt in attempts {
            assert_eq!(
                resolve(&public, attempt).await.unwrap_err(),
                ResolveError::Forbidden,
                "{attempt}"
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_forbidden() {
        let (tmp, public) = fixture();
        std::os::unix::fs::symlink(tmp.path().join("secret.txt"), public.join("shortcut.txt"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path(), public.join("up")).unwrap();

        assert_eq!(
            resolve(&public, "shortcut.txt").await.unwrap_err(),
            ResolveError::Forbidden
        );
        assert_eq!(
            resolve(&public, "up/secret.txt").await.unwrap_err(),
            ResolveError::Forbidden
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_root_is_served() {
        let (_tmp, public) = fixture();
        std::os::unix::fs::symlink(public.join("css/site.css"), public.join("alias.html"))
            .unwrap();

        let file = resolve(&public, "alias.html").await.unwrap();
        assert_eq!(&file.content[..], b"body{}");
        assert_eq!(file.content_type, "text/html");
    }

    #[tokio::test]
    async fn test_missing_and_directories_are_not_found() {
        let (_tmp, public) = fixture();
        for path in ["nope.html", "css", "css/", ".", "", "css/missing.css", "%ff%fe"] {
            assert_eq!(
                resolve(&public, path).await.unwrap_err(),
                ResolveError::NotFound,
                "{path:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("gone");
        assert_eq!(
            resolve(&gone, "index.html").await.unwrap_err(),
            ResolveError::NotFound
        );
    }

    #[test]
    fn test_contained_join() {
        let root = Path::new("/srv/public");
        assert_eq!(
            contained_join(root, "a/./b/../c.txt"),
            Some(PathBuf::from("/srv/public/a/c.txt"))
        );
        assert_eq!(contained_join(root, ""), Some(root.to_path_buf()));
        assert_eq!(contained_join(root, "a/.."), Some(root.to_path_buf()));
        assert_eq!(contained_join(root, "a/../.."), None);
        assert_eq!(contained_join(root, "/abs"), None);
    }

    #[tokio::test]
    async fn test_serve_path_status_codes() {
        let (_tmp, public) = fixture();
        let site = site(&public);

        let resp = serve_path(&ctx("/css/site.css"), &site).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/css");

        let resp = serve_path(&ctx("/../secret.txt"), &site).await;
        assert_eq!(resp.status(), 403);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(!body.windows(6).any(|w| w == b"secret"));

        let resp = serve_path(&ctx("/missing.js"), &site).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_serve_index() {
        let (_tmp, public) = fixture();

        let resp = serve_index(&ctx("/"), &site(&public)).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>home</h1>");

        stdfs::remove_file(public.join("index.html")).unwrap();
        let resp = serve_index(&ctx("/"), &site(&public)).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_if_none_match_gives_304() {
        let (_tmp, public) = fixture();
        let site = site(&public);

        let first = serve_path(&ctx("/app.js"), &site).await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let conditional = RequestContext {
            path: "/app.js",
            is_head: false,
            if_none_match: Some(etag),
        };
        let resp = serve_path(&conditional, &site).await;
        assert_eq!(resp.status(), 304);
    }
}
