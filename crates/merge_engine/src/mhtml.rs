use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

const BOUNDARY_PREFIX: &str = "----=MHTMLBoundary";

/// Wraps an already inlined page into a single-part `multipart/related` MHTML document.
///
/// `date` must be an RFC 2822 date. The boundary is derived from the page content so
/// the same input always yields the same file.
pub fn build_mhtml(html: &str, subject: &str, date: &str) -> String {
    let boundary = boundary_for(html);
    let mut out = String::with_capacity(html.len() + 512);
    out.push_str("From: <saved by html_merge>\r\n");
    out.push_str(&format!("Subject: {}\r\n", encode_header(subject)));
    out.push_str(&format!("Date: {date}\r\n"));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str("Content-Type: multipart/related;\r\n");
    out.push_str(&format!("\tboundary=\"{boundary}\";\r\n"));
    out.push_str("\ttype=\"text/html\"\r\n");
    out.push_str("\r\n");
    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/html; charset=\"utf-8\"\r\n");
    out.push_str("Content-Transfer-Encoding: 8bit\r\n");
    out.push_str("Content-Location: index.html\r\n");
    out.push_str("\r\n");
    out.push_str(html);
    out.push_str("\r\n\r\n");
    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

fn boundary_for(html: &str) -> String {
    let digest = Sha256::digest(html.as_bytes());
    let mut hex = String::with_capacity(BOUNDARY_PREFIX.len() + 32);
    hex.push_str(BOUNDARY_PREFIX);
    for byte in digest.iter().take(16) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Header values must be one line of ASCII; anything else becomes an RFC 2047 encoded word.
fn encode_header(value: &str) -> String {
    let single_line = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.is_ascii() {
        single_line
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(single_line.as_bytes()))
    }
}
