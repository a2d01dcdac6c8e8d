/// Derive a URL slug from a post title.
///
/// Lowercases, maps every run of non-alphanumeric characters to a single
/// hyphen and strips leading/trailing hyphens. The result is what appears in
/// the public post URL, so it must be stable for a given title.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    out
}
