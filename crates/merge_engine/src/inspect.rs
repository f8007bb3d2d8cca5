use scraper::{Html, Selector};

use crate::inline::is_local_reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Stylesheet,
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub reference: String,
}

/// What a page looks like before inlining: its title and the local files it pulls in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSummary {
    pub title: Option<String>,
    pub resources: Vec<ResourceRef>,
}

impl PageSummary {
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.resources.iter().filter(|r| r.kind == kind).count()
    }
}

/// Parses `html` and lists `<title>` plus every local image, stylesheet and script reference.
/// Remote (`http(s)://`) and `data:` references are left out.
pub fn summarize_page(html: &str) -> PageSummary {
    let doc = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .map(|t| t.text().collect::<String>())
        })
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty());

    let mut resources = Vec::new();
    collect(&doc, "img[src]", "src", ResourceKind::Image, &mut resources);
    collect(
        &doc,
        "link[href]",
        "href",
        ResourceKind::Stylesheet,
        &mut resources,
    );
    collect(&doc, "script[src]", "src", ResourceKind::Script, &mut resources);

    PageSummary { title, resources }
}

fn collect(doc: &Html, selector: &str, attr: &str, kind: ResourceKind, out: &mut Vec<ResourceRef>) {
    let Ok(sel) = Selector::parse(selector) else {
        return;
    };
    for element in doc.select(&sel) {
        if kind == ResourceKind::Stylesheet && !is_stylesheet_rel(element.value().attr("rel")) {
            continue;
        }
        if let Some(reference) = element.value().attr(attr) {
            if is_local_reference(reference) {
                out.push(ResourceRef {
                    kind,
                    reference: reference.to_string(),
                });
            }
        }
    }
}

fn is_stylesheet_rel(rel: Option<&str>) -> bool {
    rel.map(|rel| {
        rel.split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_local_resources_and_title() {
        let html = r#"<html><head><title>  My
            Page </title>
            <link rel="stylesheet" href="css/site.css">
            <link rel="icon" href="favicon.ico">
            <link rel="Stylesheet" href="https://cdn.example.com/x.css">
            <script src="js/app.js"></script>
            </head><body>
            <img src="img/a.png"><img src="data:image/png;base64,AAAA">
            </body></html>"#;
        let summary = summarize_page(html);

        assert_eq!(summary.title.as_deref(), Some("My Page"));
        assert_eq!(summary.count(ResourceKind::Image), 1);
        assert_eq!(summary.count(ResourceKind::Stylesheet), 1);
        assert_eq!(summary.count(ResourceKind::Script), 1);
        assert_eq!(summary.resources[0].reference, "img/a.png");
    }

    #[test]
    fn missing_title_is_none() {
        let summary = summarize_page("<p>no head</p>");
        assert_eq!(summary.title, None);
        assert!(summary.resources.is_empty());
    }
}
