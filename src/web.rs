//! Plain-HTML page fetching for the `fetch` command: pull a page, strip
//! markup, and hand back readable text.

use anyhow::{Context, bail};
use std::time::Duration;
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_TEXT_CHARS: usize = 10_000;
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// A fetched page reduced to title and visible text.
#[derive(Debug)]
pub struct PageContent {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

/// Fetch a page over http(s) and extract its readable text.
pub async fn fetch_web_content(raw_url: &str) -> anyhow::Result<PageContent> {
    let url = Url::parse(raw_url).with_context(|| format!("invalid URL '{raw_url}'"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported URL scheme '{other}' (only http and https)"),
    }

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        bail!("request failed with status {}", response.status());
    }
    let html = response.text().await?;

    let title = extract_title(&html);
    let mut text = extract_text(&html);
    if text.chars().count() > MAX_TEXT_CHARS {
        text = text.chars().take(MAX_TEXT_CHARS).collect();
        text.push_str("\n... [truncated]");
    }

    Ok(PageContent {
        url: url.to_string(),
        title,
        text,
    })
}

/// Pull the contents of the first `<title>` element.
fn extract_title(html: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets valid for slicing the original.
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title")?;
    let open_end = html[start..].find('>')? + start + 1;
    let close = lower[open_end..].find("</title>")? + open_end;
    let title = html[open_end..close].trim();
    if title.is_empty() {
        None
    } else {
        Some(decode_entities(title))
    }
}

/// Strip scripts, styles, and tags, then collapse whitespace.
fn extract_text(html: &str) -> String {
    let without_scripts = strip_element(html, "script");
    let without_styles = strip_element(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len() / 2);
    let mut in_tag = false;
    for ch in without_styles.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every `<tag ...>...</tag>` block, case-insensitively.
fn strip_element(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = lower[pos..].find(&open) {
        let start = pos + start;
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_extracted() {
        let html = "<html><head><title>Hello &amp; Welcome</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Hello & Welcome"));
    }

    #[test]
    fn missing_title_is_none() {
        assert!(extract_title("<html><body>no title</body></html>").is_none());
    }

    #[test]
    fn scripts_and_styles_are_stripped() {
        let html = "<p>keep</p><script>var x = 1;</script><style>p{}</style><p>this</p>";
        assert_eq!(extract_text(html), "keep this");
    }

    #[test]
    fn whitespace_collapses() {
        let html = "<div>\n  lots   of\n\n space </div>";
        assert_eq!(extract_text(html), "lots of space");
    }
}
