//! Rewrites a page so that its local images, stylesheets and scripts are embedded.
//!
//! Tags are located with regular expressions and spliced in place, so the rest of
//! the document is written back byte for byte.
use std::fs;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use engine_logging::{engine_debug, engine_warn};
use regex::{Captures, Regex};

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid img regex"));
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link regex"));
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>\s*</script\s*>").expect("valid script regex")
});
static CLOSING_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</script").expect("valid closing script regex"));

const UNKNOWN_IMAGE_MIME: &str = "image/unknown";

/// Counters for one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineStats {
    pub images: usize,
    pub stylesheets: usize,
    pub scripts: usize,
    /// Local references that could not be read; their tags were left untouched.
    pub skipped: Vec<String>,
}

impl InlineStats {
    pub fn inlined(&self) -> usize {
        self.images + self.stylesheets + self.scripts
    }
}

/// Inlines resources referenced relative to `base`, the folder holding the page.
pub struct ResourceInliner<'a> {
    base: &'a Path,
}

impl<'a> ResourceInliner<'a> {
    pub fn new(base: &'a Path) -> Self {
        Self { base }
    }

    /// Images first, then stylesheets, then scripts.
    pub fn inline_all(&self, html: &str) -> (String, InlineStats) {
        let mut stats = InlineStats::default();
        let html = self.inline_images(html, &mut stats);
        let html = self.inline_stylesheets(&html, &mut stats);
        let html = self.inline_scripts(&html, &mut stats);
        engine_debug!(
            "inlined {} images, {} stylesheets, {} scripts ({} skipped)",
            stats.images,
            stats.stylesheets,
            stats.scripts,
            stats.skipped.len()
        );
        (html, stats)
    }

    pub fn inline_images(&self, html: &str, stats: &mut InlineStats) -> String {
        IMG_TAG
            .replace_all(html, |caps: &Captures| {
                let tag = &caps[0];
                let Some(src) = find_attr(tag, "src") else {
                    return tag.to_string();
                };
                let Some(path) = self.local_file(&src.value, stats) else {
                    return tag.to_string();
                };
                match fs::read(&path) {
                    Ok(bytes) => {
                        let mime = mime_guess::from_path(&path)
                            .first_raw()
                            .unwrap_or(UNKNOWN_IMAGE_MIME);
                        let uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
                        stats.images += 1;
                        engine_debug!("inlined image {}", path.display());
                        splice(tag, src.range, &uri)
                    }
                    Err(err) => {
                        engine_warn!("failed to read image {}: {}", path.display(), err);
                        stats.skipped.push(src.value);
                        tag.to_string()
                    }
                }
            })
            .into_owned()
    }

    pub fn inline_stylesheets(&self, html: &str, stats: &mut InlineStats) -> String {
        LINK_TAG
            .replace_all(html, |caps: &Captures| {
                let tag = &caps[0];
                let is_stylesheet = find_attr(tag, "rel")
                    .map(|rel| {
                        rel.value
                            .split_whitespace()
                            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                    })
                    .unwrap_or(false);
                if !is_stylesheet {
                    return tag.to_string();
                }
                let Some(href) = find_attr(tag, "href") else {
                    return tag.to_string();
                };
                let Some(path) = self.local_file(&href.value, stats) else {
                    return tag.to_string();
                };
                match fs::read(&path) {
                    Ok(bytes) => {
                        let css = String::from_utf8_lossy(&bytes);
                        stats.stylesheets += 1;
                        engine_debug!("inlined stylesheet {}", path.display());
                        match find_attr(tag, "media") {
                            Some(media) => format!(
                                "<style media=\"{}\">\n{css}\n</style>",
                                media.value.replace('"', "&quot;")
                            ),
                            None => format!("<style>\n{css}\n</style>"),
                        }
                    }
                    Err(err) => {
                        engine_warn!("failed to read stylesheet {}: {}", path.display(), err);
                        stats.skipped.push(href.value);
                        tag.to_string()
                    }
                }
            })
            .into_owned()
    }

    pub fn inline_scripts(&self, html: &str, stats: &mut InlineStats) -> String {
        SCRIPT_TAG
            .replace_all(html, |caps: &Captures| {
                let tag = &caps[0];
                let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let Some(src) = find_attr(attrs, "src") else {
                    return tag.to_string();
                };
                let Some(path) = self.local_file(&src.value, stats) else {
                    return tag.to_string();
                };
                match fs::read(&path) {
                    Ok(bytes) => {
                        let js = String::from_utf8_lossy(&bytes);
                        // A literal `</script` would end the inline element early.
                        let js = CLOSING_SCRIPT.replace_all(&js, "<\\/script");
                        stats.scripts += 1;
                        engine_debug!("inlined script {}", path.display());
                        match find_attr(attrs, "type") {
                            Some(kind) => format!(
                                "<script type=\"{}\">\n{js}\n</script>",
                                kind.value.replace('"', "&quot;")
                            ),
                            None => format!("<script>\n{js}\n</script>"),
                        }
                    }
                    Err(err) => {
                        engine_warn!("failed to read script {}: {}", path.display(), err);
                        stats.skipped.push(src.value);
                        tag.to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Resolves a local reference to an existing file, recording it as skipped otherwise.
    /// Remote and `data:` references yield `None` without being recorded.
    fn local_file(&self, reference: &str, stats: &mut InlineStats) -> Option<PathBuf> {
        if !is_local_reference(reference) {
            return None;
        }
        match resolve_reference(self.base, reference) {
            Some(path) if path.is_file() => Some(path),
            Some(path) => {
                engine_warn!("referenced file does not exist: {}", path.display());
                stats.skipped.push(reference.to_string());
                None
            }
            None => {
                stats.skipped.push(reference.to_string());
                None
            }
        }
    }
}

/// False for remote (`http://`, `https://`, `//host`) and `data:` references.
pub(crate) fn is_local_reference(reference: &str) -> bool {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("//") || reference.starts_with('#') {
        return false;
    }
    let lower = reference
        .get(..8)
        .unwrap_or(reference)
        .to_ascii_lowercase();
    !(lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:"))
}

/// Maps a reference to a path under `base`. Query strings and fragments are dropped,
/// percent-escapes decoded, and a leading `/` is taken relative to `base`.
pub(crate) fn resolve_reference(base: &Path, reference: &str) -> Option<PathBuf> {
    let trimmed = reference.trim();
    let without_suffix = trimmed.split(&['?', '#'][..]).next().unwrap_or(trimmed);
    if without_suffix.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(without_suffix)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| without_suffix.to_string())
        .replace("&amp;", "&");
    let relative = decoded.trim_start_matches(&['/', '\\'][..]);
    if relative.is_empty() {
        return None;
    }
    Some(normalize(&base.join(relative)))
}

/// Lexical normalization: drops `.` and folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

struct AttrMatch {
    /// Byte range of the value inside the tag, quotes excluded.
    range: Range<usize>,
    value: String,
}

fn find_attr(tag: &str, name: &str) -> Option<AttrMatch> {
    static ATTR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?s)\s([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("valid attribute regex")
    });
    ATTR.captures_iter(tag).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        Some(AttrMatch {
            range: value.range(),
            value: value.as_str().to_string(),
        })
    })
}

fn splice(tag: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(tag.len() + replacement.len());
    out.push_str(&tag[..range.start]);
    out.push_str(replacement);
    out.push_str(&tag[range.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_reference_detection() {
        assert!(is_local_reference("img/a.png"));
        assert!(is_local_reference("/img/a.png"));
        assert!(!is_local_reference("HTTPS://example.com/a.png"));
        assert!(!is_local_reference("http://example.com/a.png"));
        assert!(!is_local_reference("data:image/png;base64,AAAA"));
        assert!(!is_local_reference("//cdn.example.com/a.js"));
        assert!(!is_local_reference(""));
    }

    #[test]
    fn references_are_normalized_under_base() {
        let base = Path::new("/site/page");
        assert_eq!(
            resolve_reference(base, "./img/../img/a%20b.png?v=2#top"),
            Some(PathBuf::from("/site/page/img/a b.png"))
        );
        assert_eq!(
            resolve_reference(base, "../shared/x.css"),
            Some(PathBuf::from("/site/shared/x.css"))
        );
        assert_eq!(
            resolve_reference(base, "/abs.js"),
            Some(PathBuf::from("/site/page/abs.js"))
        );
        assert_eq!(resolve_reference(base, "?only=query"), None);
    }

    #[test]
    fn attributes_are_found_regardless_of_quoting_and_order() {
        let tag = r#"<img alt="x" data-src="no.png" SRC='yes.png' width=10>"#;
        let src = find_attr(tag, "src").unwrap();
        assert_eq!(src.value, "yes.png");
        assert_eq!(&tag[src.range], "yes.png");

        let width = find_attr(tag, "width").unwrap();
        assert_eq!(width.value, "10");
        assert!(find_attr(tag, "height").is_none());
    }

    #[test]
    fn splice_replaces_only_the_value() {
        let tag = r#"<img src="a.png" alt="a">"#;
        let src = find_attr(tag, "src").unwrap();
        assert_eq!(splice(tag, src.range, "b.png"), r#"<img src="b.png" alt="a">"#);
    }
}
