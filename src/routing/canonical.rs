//! Canonical URL construction.
//!
//! A page is indexed without its trailing slash, so `/about/` and `/about`
//! both advertise `https://example.com/about`. The root stays `/`.

/// Strip one trailing `/`, except for the root itself.
pub fn canonical_path(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.strip_suffix('/').unwrap_or(path)
}

/// Absolute canonical URL for `path` under `origin`.
pub fn canonical_url(origin: &str, path: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), canonical_path(path))
}

/// Value of the `Link` response header.
pub fn canonical_link(origin: &str, path: &str) -> String {
    format!("<{}>; rel=\"canonical\"", canonical_url(origin, path))
}
