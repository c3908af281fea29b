// ABOUTME: Gutenberg block comment formatting, one helper per block type.
// ABOUTME: The `wp:` comment grammar is byte-exact; WordPress string-matches the type token.

use serde_json::{Map, Value};

pub type Attrs = Map<String, Value>;

/// Escape text for placement inside attribute values or code blocks.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wrap content in block-comment delimiters. The JSON segment and its
/// leading space are omitted entirely when `attrs` is empty; an empty `{}`
/// would break WordPress's parser.
pub fn wrap(block_type: &str, attrs: &Attrs, content: &str) -> String {
    if attrs.is_empty() {
        format!("<!-- wp:{block_type} -->\n{content}\n<!-- /wp:{block_type} -->")
    } else {
        // serde_json maps are BTree-backed, so key order (and output bytes)
        // are stable across runs.
        let json = serde_json::to_string(attrs).unwrap_or_else(|_| "{}".to_string());
        format!("<!-- wp:{block_type} {json} -->\n{content}\n<!-- /wp:{block_type} -->")
    }
}

/// Join finished blocks with the blank-line separator WordPress expects.
pub fn join(blocks: &[String]) -> String {
    blocks.join("\n\n")
}

fn align_class(align: Option<&str>) -> String {
    match align {
        Some(a) => format!(" class=\"has-text-align-{a}\""),
        None => String::new(),
    }
}

pub fn paragraph(inner: &str, align: Option<&str>) -> String {
    let mut attrs = Attrs::new();
    if let Some(a) = align {
        attrs.insert("align".to_string(), Value::String(a.to_string()));
    }
    let content = format!("<p{}>{inner}</p>", align_class(align));
    wrap("paragraph", &attrs, &content)
}

pub fn heading(inner: &str, level: u8, align: Option<&str>) -> String {
    let mut attrs = Attrs::new();
    // h2 is the implicit default level.
    if level != 2 {
        attrs.insert("level".to_string(), Value::from(level));
    }
    if let Some(a) = align {
        attrs.insert("textAlign".to_string(), Value::String(a.to_string()));
    }
    let content = format!("<h{level}{}>{inner}</h{level}>", align_class(align));
    wrap("heading", &attrs, &content)
}

pub fn list(items: &[String], ordered: bool) -> String {
    let mut attrs = Attrs::new();
    if ordered {
        attrs.insert("ordered".to_string(), Value::Bool(true));
    }
    let tag = if ordered { "ol" } else { "ul" };
    let body: String = items
        .iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect();
    wrap("list", &attrs, &format!("<{tag}>{body}</{tag}>"))
}

pub fn image(
    src: &str,
    alt: &str,
    width: Option<u32>,
    height: Option<u32>,
    caption: Option<&str>,
) -> String {
    let mut attrs = Attrs::new();
    if let Some(w) = width {
        attrs.insert("width".to_string(), Value::from(w));
    }
    if let Some(h) = height {
        attrs.insert("height".to_string(), Value::from(h));
    }
    let mut img = format!(
        "<img src=\"{}\" alt=\"{}\"",
        escape_html(src),
        escape_html(alt)
    );
    if let Some(w) = width {
        img.push_str(&format!(" width=\"{w}\""));
    }
    if let Some(h) = height {
        img.push_str(&format!(" height=\"{h}\""));
    }
    img.push_str(" />");

    let mut content = format!("<figure class=\"wp-block-image\">{img}");
    if let Some(caption) = caption {
        content.push_str(&format!("<figcaption>{caption}</figcaption>"));
    }
    content.push_str("</figure>");
    wrap("image", &attrs, &content)
}

pub fn quote(inner: &str, citation: Option<&str>) -> String {
    let mut content = format!("<blockquote class=\"wp-block-quote\">{inner}");
    if let Some(cite) = citation {
        content.push_str(&format!("<cite>{cite}</cite>"));
    }
    content.push_str("</blockquote>");
    wrap("quote", &Attrs::new(), &content)
}

pub fn code(text: &str, language: Option<&str>) -> String {
    let mut attrs = Attrs::new();
    if let Some(lang) = language {
        attrs.insert("language".to_string(), Value::String(lang.to_string()));
    }
    let content = format!(
        "<pre class=\"wp-block-code\"><code>{}</code></pre>",
        escape_html(text)
    );
    wrap("code", &attrs, &content)
}

pub fn separator() -> String {
    wrap(
        "separator",
        &Attrs::new(),
        "<hr class=\"wp-block-separator\" />",
    )
}

/// Header and cell strings are raw HTML; callers escape plain text first.
pub fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut content = String::from("<figure class=\"wp-block-table\"><table>");
    if !headers.is_empty() {
        content.push_str("<thead><tr>");
        for h in headers {
            content.push_str(&format!("<th>{h}</th>"));
        }
        content.push_str("</tr></thead>");
    }
    content.push_str("<tbody>");
    for row in rows {
        content.push_str("<tr>");
        for cell in row {
            content.push_str(&format!("<td>{cell}</td>"));
        }
        content.push_str("</tr>");
    }
    content.push_str("</tbody></table></figure>");
    wrap("table", &Attrs::new(), &content)
}

/// Opaque passthrough for markup with no block equivalent.
pub fn html_block(raw: &str) -> String {
    wrap("html", &Attrs::new(), raw)
}
