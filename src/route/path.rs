//! URL resolution — lexical path cleaning and joining.
//!
//! Route URLs are normalized exactly the way a slash-separated file path is
//! cleaned: repeated separators collapse, `.` segments vanish, `..` removes the
//! preceding segment, and a rooted path never climbs above `/`.

/// Lexically normalize a slash-separated path.
///
/// Applies, in order:
///
/// 1. Replace runs of `/` with a single `/`.
/// 2. Drop every `.` segment.
/// 3. Drop every `..` together with the non-`..` segment preceding it.
/// 4. Drop `..` segments that begin a rooted path.
///
/// The result has no trailing slash unless it is the root `/`. An empty input
/// (or one that cleans to nothing) yields `.`.
///
/// # Examples
///
/// ```
/// use dynaroute::route::path::clean;
///
/// assert_eq!(clean("/api//user/./:id/"), "/api/user/:id");
/// assert_eq!(clean("/api/v1/../v2"), "/api/v2");
/// assert_eq!(clean("/.."), "/");
/// assert_eq!(clean(""), ".");
/// ```
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_owned();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    }
}

/// Join path parts with `/` and [`clean`] the result.
///
/// Empty parts are ignored; if every part is empty the result is the empty
/// string rather than `.`.
///
/// # Examples
///
/// ```
/// use dynaroute::route::path::join;
///
/// assert_eq!(join(["/api", "/user", "/:id"]), "/api/user/:id");
/// assert_eq!(join(["/user", ""]), "/user");
/// assert_eq!(join(["", ""]), "");
/// ```
pub fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join("/"))
}

/// Resolve a node's own `prefix` + `param` segment against its parent's URL.
///
/// With no parent the local segment alone is cleaned, which for the root
/// prefix `/` yields `/`.
pub fn resolve(parent_url: Option<&str>, prefix: &str, param: &str) -> String {
    let local = join([prefix, param]);
    match parent_url {
        Some(parent) => clean(&join([parent, local.as_str()])),
        None => clean(&local),
    }
}
