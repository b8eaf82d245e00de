// File: ./src/markup.rs
// Plain text to storable HTML
use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:https?://|www\.)[^\s<>"']+"#).expect("valid url pattern")
});
static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:<br/>\s*){2,}").expect("valid break pattern"));

/// Converts plain description text into markup that is safe to store and render.
pub trait MarkupConverter {
    fn to_safe_markup(&self, plain: &str) -> String;
}

/// Escapes HTML, keeps links clickable and turns blank lines into paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextHtml;

impl MarkupConverter for PlaintextHtml {
    fn to_safe_markup(&self, plain: &str) -> String {
        let escaped = html_escape(plain);
        let with_breaks = escaped
            .replace("\r\n", "<br/>")
            .replace(['\r', '\n'], "<br/>");
        let linked = keep_urls(&with_breaks);

        let paragraphs: Vec<&str> = PARAGRAPH_BREAK_RE.split(&linked).collect();
        format!("<p>{}</p>", paragraphs.join("</p><p>"))
    }
}

pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn keep_urls(text: &str) -> String {
    URL_RE
        .replace_all(text, |caps: &regex::Captures| {
            let url = &caps[0];
            let href = if url.starts_with("www.") {
                format!("http://{}", url)
            } else {
                url.to_string()
            };
            format!(
                r#"<a href="{}" target="_blank" rel="noreferrer noopener">{}</a>"#,
                href, url
            )
        })
        .into_owned()
}
