//! URL and display-text helpers

/// Join a base URL and a path with exactly one `/` between them
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, path)
}

/// Render an enum-style constant for display (`IN_PROGRESS` -> `IN PROGRESS`)
pub fn format_label(s: &str) -> String {
    s.replace('_', " ")
}
