// ABOUTME: Recursive descent from cleaned HTML to Gutenberg block markup.
// ABOUTME: Dispatches on lower-cased tag name; unknown tags become opaque HTML blocks.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node, Selector};

use crate::blocks;
use crate::dom::{self, Rewrite};
use crate::styles::StyleMap;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Keep inline `style` attributes in emitted block content.
    pub preserve_styles: bool,
    /// Emit unrecognized tags as opaque HTML blocks instead of dropping them.
    pub convert_unknown_to_html: bool,
    /// Wrap loose body-level text in paragraph blocks.
    pub wrap_loose_text: bool,
    /// Divs carrying this class pass through verbatim as HTML blocks.
    pub disclaimer_class: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preserve_styles: false,
            convert_unknown_to_html: true,
            wrap_loose_text: true,
            disclaimer_class: "disclaimer-block".to_string(),
        }
    }
}

/// Convert a cleaned fragment into block markup, blocks joined by a blank
/// line.
pub fn convert(html: &str, options: &ConvertOptions) -> String {
    let doc = dom::parse_doc(html);
    let body = dom::body_node(&doc);
    blocks::join(&convert_children(body, options))
}

fn convert_children(node: NodeRef<'_, Node>, options: &ConvertOptions) -> Vec<String> {
    let mut out = Vec::new();
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                if !options.wrap_loose_text {
                    continue;
                }
                let trimmed = text.replace('\u{a0}', " ");
                let trimmed = trimmed.trim();
                if !trimmed.is_empty() {
                    out.push(blocks::paragraph(&dom::escape_text(trimmed), None));
                }
            }
            Node::Element(_) => {
                let el = ElementRef::wrap(child).expect("element node");
                convert_element(&el, options, &mut out);
            }
            _ => {}
        }
    }
    out
}

fn convert_element(el: &ElementRef<'_>, options: &ConvertOptions, out: &mut Vec<String>) {
    let tag = el.value().name().to_lowercase();
    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level: u8 = tag[1..].parse().unwrap_or(2);
            let inner = inner_html(el, options);
            if !dom::is_semantically_empty(el, true) {
                out.push(blocks::heading(&inner, level, sniff_align(el)));
            }
        }
        "p" => {
            // Empty paragraphs yield no block at all.
            if !dom::is_semantically_empty(el, true) {
                out.push(blocks::paragraph(&inner_html(el, options), sniff_align(el)));
            }
        }
        "ul" | "ol" => {
            let items: Vec<String> = el
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|li| li.value().name().eq_ignore_ascii_case("li"))
                .map(|li| inner_html(&li, options))
                .collect();
            if !items.is_empty() {
                out.push(blocks::list(&items, tag == "ol"));
            }
        }
        "img" => {
            if let Some(block) = image_block(el, None) {
                out.push(block);
            }
        }
        "figure" => {
            let img = Selector::parse("img").unwrap();
            match el.select(&img).next() {
                Some(image) => {
                    let caption = figure_caption(el, options);
                    if let Some(block) = image_block(&image, caption.as_deref()) {
                        out.push(block);
                    }
                }
                None => unknown(el, options, out),
            }
        }
        "blockquote" => out.push(quote_block(el, options)),
        "pre" | "code" => out.push(code_block(el)),
        "hr" => out.push(blocks::separator()),
        "table" => out.push(table_block(el, options)),
        "div" => {
            if el
                .value()
                .classes()
                .any(|c| c == options.disclaimer_class)
            {
                // Policy-injected markup passes through untouched.
                out.push(blocks::html_block(&dom::outer_html(**el)));
            } else {
                out.extend(convert_children(**el, options));
            }
        }
        "span" | "strong" | "b" | "em" | "i" | "a" => {
            // Inline content loose at container level becomes one paragraph.
            if !dom::is_semantically_empty(el, true) {
                out.push(blocks::paragraph(
                    &dom::outer_html_styled(**el, options.preserve_styles),
                    None,
                ));
            }
        }
        "br" => {}
        _ => unknown(el, options, out),
    }
}

fn unknown(el: &ElementRef<'_>, options: &ConvertOptions, out: &mut Vec<String>) {
    if options.convert_unknown_to_html {
        out.push(blocks::html_block(&dom::outer_html_styled(
            **el,
            options.preserve_styles,
        )));
    }
}

fn inner_html(el: &ElementRef<'_>, options: &ConvertOptions) -> String {
    dom::inner_html_styled(**el, options.preserve_styles)
}

/// Text alignment from the inline `text-align` declaration or an
/// alignment-suggestive class name. Only the `text-align` property value is
/// consulted, so declarations like `margin-right` cannot misfire.
fn sniff_align(el: &ElementRef<'_>) -> Option<&'static str> {
    if let Some(style) = el.value().attr("style") {
        if let Some(value) = StyleMap::parse(style).get("text-align") {
            let value = value.to_lowercase();
            for dir in ["center", "right", "left"] {
                if value.contains(dir) {
                    return Some(dir);
                }
            }
        }
    }
    for class in el.value().classes() {
        let class = class.to_lowercase();
        for dir in ["center", "right", "left"] {
            if class.contains(&format!("text-{dir}")) || class.contains(&format!("align-{dir}")) {
                return Some(dir);
            }
        }
    }
    None
}

fn image_block(img: &ElementRef<'_>, caption: Option<&str>) -> Option<String> {
    let src = img.value().attr("src")?;
    let alt = img.value().attr("alt").unwrap_or("");
    let width = img.value().attr("width").and_then(|w| w.parse().ok());
    let height = img.value().attr("height").and_then(|h| h.parse().ok());
    Some(blocks::image(src, alt, width, height, caption))
}

fn figure_caption(figure: &ElementRef<'_>, options: &ConvertOptions) -> Option<String> {
    let figcaption = Selector::parse("figcaption").unwrap();
    figure
        .select(&figcaption)
        .next()
        .filter(|fc| !dom::is_semantically_empty(fc, true))
        .map(|fc| inner_html(&fc, options))
}

/// Blockquote: a `<cite>` descendant becomes the citation and leaves the
/// quoted body.
fn quote_block(el: &ElementRef<'_>, options: &ConvertOptions) -> String {
    let cite_sel = Selector::parse("cite").unwrap();
    let cite = el.select(&cite_sel).next();
    let citation = cite.map(|c| dom::element_text(&c).trim().to_string());

    let rw = Rewrite {
        skip: cite.map(|c| c.id()).into_iter().collect(),
        strip_styles: !options.preserve_styles,
        ..Rewrite::new()
    };
    blocks::quote(&rw.apply(**el), citation.as_deref())
}

/// Pre/code: prefer a nested `<code>` element's text; recover a language
/// from a `language-xxx` class on it.
fn code_block(el: &ElementRef<'_>) -> String {
    let code_sel = Selector::parse("code").unwrap();
    let code_el = if el.value().name().eq_ignore_ascii_case("code") {
        Some(*el)
    } else {
        el.select(&code_sel).next()
    };
    let (text, language) = match code_el {
        Some(code) => {
            let language = code
                .value()
                .classes()
                .find_map(|c| c.strip_prefix("language-").map(|l| l.to_string()));
            (dom::element_text(&code), language)
        }
        None => (dom::element_text(el), None),
    };
    blocks::code(text.trim_matches('\n'), language.as_deref())
}

fn table_block(el: &ElementRef<'_>, options: &ConvertOptions) -> String {
    let th_or_td = Selector::parse("th, td").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let thead_sel = Selector::parse("thead").unwrap();

    let thead = el.select(&thead_sel).next();
    let all_rows: Vec<ElementRef<'_>> = el
        .select(&tr_sel)
        .filter(|tr| {
            // Rows inside <thead> are header material, not body rows.
            !tr.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name().eq_ignore_ascii_case("thead"))
        })
        .collect();

    let (headers, body_rows) = match thead {
        Some(thead) => {
            let headers = thead
                .select(&th_or_td)
                .map(|cell| inner_html(&cell, options))
                .collect::<Vec<_>>();
            (headers, all_rows)
        }
        None => match all_rows.split_first() {
            Some((first, rest)) => {
                let headers = first
                    .select(&th_or_td)
                    .map(|cell| inner_html(&cell, options))
                    .collect::<Vec<_>>();
                (headers, rest.to_vec())
            }
            None => (Vec::new(), Vec::new()),
        },
    };

    let rows: Vec<Vec<String>> = body_rows
        .iter()
        .map(|tr| {
            tr.select(&th_or_td)
                .map(|cell| inner_html(&cell, options))
                .collect()
        })
        .collect();
    blocks::table(&headers, &rows)
}
