use std::fs;
use std::path::Path;
use std::sync::Arc;

use merge_engine::{convert_folder, find_main_page, ConvertError, EngineFormat, MergeSettings};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn fixed_clock() -> MergeSettings {
    MergeSettings {
        clock: Arc::new(|| "Mon, 01 Jan 2024 00:00:00 +0000".to_string()),
    }
}

fn write(path: &Path, content: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A saved page: `site/index.html` with an image, a stylesheet and a script.
fn saved_site(root: &Path) -> std::path::PathBuf {
    let site = root.join("site");
    write(
        &site.join("index.html"),
        r#"<html><head><title>Saved Page</title>
<link rel="stylesheet" href="css/site.css">
<link rel="stylesheet" href="https://cdn.example.com/remote.css">
<script src="js/app.js"></script>
</head><body>
<img alt="logo" src="img/logo.png">
<img src="img/missing.png">
<img src="http://example.com/remote.png">
</body></html>"#,
    );
    write(&site.join("css/site.css"), "body { color: red; }");
    write(&site.join("js/app.js"), "console.log('</script>');");
    write(&site.join("img/logo.png"), PNG_BYTES);
    site
}

#[test]
fn html_output_inlines_local_resources() {
    let temp = TempDir::new().unwrap();
    let site = saved_site(temp.path());
    let out = temp.path().join("out");

    let outcome = convert_folder(&site, EngineFormat::Html, Some(&out), &fixed_clock()).unwrap();
    assert_eq!(outcome.output_path, out.join("site.html"));
    assert_eq!(outcome.main_page, site.join("index.html"));
    assert_eq!(outcome.stats.images, 1);
    assert_eq!(outcome.stats.stylesheets, 1);
    assert_eq!(outcome.stats.scripts, 1);
    assert_eq!(outcome.stats.skipped, vec!["img/missing.png".to_string()]);

    let html = fs::read_to_string(&outcome.output_path).unwrap();
    assert!(html.contains(r#"<img alt="logo" src="data:image/png;base64,iVBORw0KGgo=">"#));
    assert!(html.contains("<style>\nbody { color: red; }\n</style>"));
    assert!(html.contains("<script>\nconsole.log('<\\/script>');\n</script>"));
    assert!(html.contains(r#"<img src="img/missing.png">"#));
    assert!(html.contains(r#"<img src="http://example.com/remote.png">"#));
    assert!(html.contains(r#"href="https://cdn.example.com/remote.css""#));
    assert!(!html.contains("css/site.css"));
    assert_eq!(outcome.bytes_written, html.len() as u64);
}

#[test]
fn mhtml_output_uses_page_title_as_subject() {
    let temp = TempDir::new().unwrap();
    let site = saved_site(temp.path());

    let outcome = convert_folder(&site, EngineFormat::Mhtml, Some(temp.path()), &fixed_clock())
        .unwrap();
    assert_eq!(outcome.output_path, temp.path().join("site.mhtml"));

    let doc = fs::read_to_string(&outcome.output_path).unwrap();
    assert!(doc.contains("Subject: Saved Page\r\n"));
    assert!(doc.contains("Date: Mon, 01 Jan 2024 00:00:00 +0000\r\n"));
    assert!(doc.contains("Content-Type: multipart/related;"));
    assert!(doc.contains("data:image/png;base64,"));
}

#[test]
fn output_defaults_next_to_folder() {
    let temp = TempDir::new().unwrap();
    let site = saved_site(temp.path());

    let outcome = convert_folder(&site, EngineFormat::Html, None, &fixed_clock()).unwrap();
    assert_eq!(outcome.output_path, temp.path().join("site.html"));
}

#[test]
fn missing_output_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let site = saved_site(temp.path());
    let out = temp.path().join("a").join("b");

    convert_folder(&site, EngineFormat::Html, Some(&out), &fixed_clock()).unwrap();
    assert!(out.join("site.html").is_file());
}

#[test]
fn index_html_is_preferred_over_other_pages() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("about.html"), "a");
    write(&temp.path().join("index.html"), "i");
    write(&temp.path().join("notes.txt"), "n");
    assert_eq!(
        find_main_page(temp.path()).unwrap(),
        temp.path().join("index.html")
    );

    fs::remove_file(temp.path().join("index.html")).unwrap();
    write(&temp.path().join("contact.HTM"), "c");
    assert_eq!(
        find_main_page(temp.path()).unwrap(),
        temp.path().join("about.html")
    );
}

#[test]
fn folder_without_pages_fails() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("readme.txt"), "x");

    let err = convert_folder(temp.path(), EngineFormat::Html, None, &fixed_clock()).unwrap_err();
    assert!(matches!(err, ConvertError::NoHtmlFile(_)));

    let err = convert_folder(
        &temp.path().join("readme.txt"),
        EngineFormat::Html,
        None,
        &fixed_clock(),
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::NotADirectory(_)));
}

#[test]
fn non_utf8_page_is_decoded() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("latin");
    write(
        &site.join("index.html"),
        b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xE9</body></html>".as_slice(),
    );

    let outcome = convert_folder(&site, EngineFormat::Html, None, &fixed_clock()).unwrap();
    let html = fs::read_to_string(outcome.output_path).unwrap();
    assert!(html.contains("café"));
    assert!(html.contains(r#"<meta charset="utf-8">"#));
}

#[test]
fn earlier_output_inside_the_folder_is_not_taken_as_the_page() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("site");
    write(&site.join("tour.html"), "<p>tour v1</p>");

    let first = convert_folder(&site, EngineFormat::Html, Some(&site), &fixed_clock()).unwrap();
    assert_eq!(first.output_path, site.join("site.html"));

    write(&site.join("tour.html"), "<p>tour v2</p>");
    let second = convert_folder(&site, EngineFormat::Html, Some(&site), &fixed_clock()).unwrap();
    assert_eq!(second.main_page, site.join("tour.html"));
    assert!(fs::read_to_string(second.output_path)
        .unwrap()
        .contains("tour v2"));
}
