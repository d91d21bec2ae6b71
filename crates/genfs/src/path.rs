//! Helpers for the slash-separated relative paths genfs works with.
//!
//! Every path in the tree is cleaned: no `.` or `..` segments, no empty
//! segments, no leading or trailing slash. The root is the literal `"."`.

/// Check that a target is already clean and relative.
///
/// Resolution targets must arrive in canonical form; registration paths go
/// through [`clean`] first instead.
pub fn is_valid(path: &str) -> bool {
    if path == "." {
        return true;
    }
    if path.is_empty() {
        return false;
    }
    path.split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Canonicalize a path: drop `.` segments, resolve `..` against earlier
/// segments (excess `..` at the root is dropped), collapse slashes. An empty
/// result is the root `"."`.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(seg),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Join a base directory and a relative path, cleaning the result.
pub fn join(base: &str, rel: &str) -> String {
    if base == "." || base.is_empty() {
        return clean(rel);
    }
    if rel == "." || rel.is_empty() {
        return clean(base);
    }
    clean(&format!("{base}/{rel}"))
}

/// The parent directory of a cleaned path; `"."` for top-level names and
/// the root itself.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// The last segment of a cleaned path; the root's base is `"."`.
pub fn base(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Strip `base` from the front of `target`; `"."` when they are equal,
/// `target` unchanged when it is not beneath `base`.
pub fn relative<'t>(base: &str, target: &'t str) -> &'t str {
    if target == base {
        return ".";
    }
    if base == "." {
        return target;
    }
    match target.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => target,
    }
}

/// The extension of the last segment, including the dot; empty if none.
pub fn ext(path: &str) -> &str {
    let name = base(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}
