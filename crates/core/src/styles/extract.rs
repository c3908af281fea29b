// ABOUTME: Parses <style> blocks and inline style attributes into selector-keyed property maps.
// ABOUTME: Handles comments, @import, @media nesting, and declaration scanning inside url()/quotes.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static CSS_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)@import[^;]*;").unwrap());
static CLASS_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(-?[A-Za-z_][\w-]*)").unwrap());
static ID_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(-?[A-Za-z_][\w-]*)").unwrap());

/// An ordered CSS property map. Later writes to an existing property replace
/// its value in place, so serialization order is first-insertion order and
/// output stays deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    props: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration block body (`color: red; margin: 0`).
    pub fn parse(declarations: &str) -> Self {
        let mut map = StyleMap::new();
        for decl in split_declarations(declarations) {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim().to_lowercase();
                let value = value.trim();
                if !prop.is_empty() && !value.is_empty() {
                    map.set(&prop, value);
                }
            }
        }
        map
    }

    /// Set a property, replacing any existing value (last write wins).
    pub fn set(&mut self, prop: &str, value: &str) {
        if let Some(entry) = self.props.iter_mut().find(|(k, _)| k == prop) {
            entry.1 = value.to_string();
        } else {
            self.props.push((prop.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k == prop)
            .map(|(_, v)| v.as_str())
    }

    /// Merge `other` into self; `other`'s values win on collision.
    pub fn merge_from(&mut self, other: &StyleMap) {
        for (prop, value) in &other.props {
            self.set(prop, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as a `style` attribute value: `prop: value; prop: value`.
    pub fn to_attr(&self) -> String {
        self.props
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// The style index built once per document by `extract`.
#[derive(Debug, Clone, Default)]
pub struct StyleIndex {
    /// `.foo` → declarations.
    pub class_map: HashMap<String, StyleMap>,
    /// `#bar` → declarations.
    pub id_map: HashMap<String, StyleMap>,
    /// `p`, `span`, … → declarations.
    pub element_map: HashMap<String, StyleMap>,
    /// Full selector text → declarations, unsplit.
    pub selector_map: HashMap<String, StyleMap>,
    /// `@media` query text → rules parsed inside that block.
    pub media_queries: HashMap<String, Vec<(String, StyleMap)>>,
    /// Diagnostic collection of existing `style="…"` attributes, keyed by
    /// id, `tag.class1.class2`, or `tag[ordinal]`.
    pub inline_styles: HashMap<String, StyleMap>,
}

/// Parse every `<style>` element and inline style attribute in `html`.
pub fn extract(html: &str) -> StyleIndex {
    let mut index = StyleIndex::default();
    let doc = Html::parse_document(html);

    let style_sel = Selector::parse("style").unwrap();
    for style_el in doc.select(&style_sel) {
        let css: String = style_el.text().collect();
        parse_stylesheet(&css, &mut index);
    }

    collect_inline_styles(&doc, &mut index);
    index
}

fn parse_stylesheet(css: &str, index: &mut StyleIndex) {
    let css = CSS_COMMENT_RE.replace_all(css, "");
    let css = IMPORT_RE.replace_all(&css, "");

    for (selector, body) in split_rules(&css) {
        if let Some(query) = selector.strip_prefix("@media") {
            let query = query.trim().to_string();
            let nested = split_rules(&body)
                .into_iter()
                .map(|(sel, decls)| (sel, StyleMap::parse(&decls)))
                .collect::<Vec<_>>();
            index
                .media_queries
                .entry(query)
                .or_default()
                .extend(nested);
            continue;
        }
        if selector.starts_with('@') {
            // @font-face, @keyframes and friends carry no selector tokens.
            continue;
        }

        let map = StyleMap::parse(&body);
        if map.is_empty() {
            continue;
        }
        index
            .selector_map
            .entry(selector.clone())
            .or_default()
            .merge_from(&map);

        for single in selector.split(',') {
            let single = single.trim();
            if single.is_empty() {
                continue;
            }
            for cap in CLASS_TOKEN_RE.captures_iter(single) {
                index
                    .class_map
                    .entry(cap[1].to_string())
                    .or_default()
                    .merge_from(&map);
            }
            if let Some(cap) = ID_TOKEN_RE.captures(single) {
                index
                    .id_map
                    .entry(cap[1].to_string())
                    .or_default()
                    .merge_from(&map);
            }
            for tag in element_tokens(single) {
                index
                    .element_map
                    .entry(tag)
                    .or_default()
                    .merge_from(&map);
            }
        }
    }
}

/// Split a stylesheet into `(selector, declaration-body)` pairs by matching
/// balanced braces. `@media` blocks come back with their inner rules as the
/// body for nested parsing.
fn split_rules(css: &str) -> Vec<(String, String)> {
    let mut rules = Vec::new();
    let mut selector = String::new();
    let mut body = String::new();
    let mut depth = 0usize;

    for ch in css.chars() {
        match ch {
            '{' => {
                depth += 1;
                if depth > 1 {
                    body.push(ch);
                }
            }
            '}' => {
                if depth > 1 {
                    body.push(ch);
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let sel = selector.trim().to_string();
                    if !sel.is_empty() {
                        rules.push((sel, body.trim().to_string()));
                    }
                    selector.clear();
                    body.clear();
                }
            }
            _ => {
                if depth == 0 {
                    selector.push(ch);
                } else {
                    body.push(ch);
                }
            }
        }
    }
    rules
}

/// Split a declaration block on `;` without splitting inside `()` or quotes,
/// so `url(...)`, `calc(...)`, and quoted content survive intact.
fn split_declarations(block: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in block.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' => {
                    paren_depth = paren_depth.saturating_sub(1);
                    current.push(ch);
                }
                ';' if paren_depth == 0 => {
                    let decl = current.trim().to_string();
                    if !decl.is_empty() {
                        out.push(decl);
                    }
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }
    let decl = current.trim().to_string();
    if !decl.is_empty() {
        out.push(decl);
    }
    out
}

/// Pull bare element names out of a single selector: identifiers not prefixed
/// by `.`/`#` and outside attribute/pseudo suffixes.
fn element_tokens(selector: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for part in selector.split(|c: char| c.is_whitespace() || c == '>' || c == '+' || c == '~') {
        let part = part.trim();
        if part.is_empty() || part.starts_with('.') || part.starts_with('#') || part == "*" {
            continue;
        }
        let name: String = part
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if !name.is_empty() && name.chars().next().unwrap().is_ascii_alphabetic() {
            tags.push(name.to_lowercase());
        }
    }
    tags
}

fn collect_inline_styles(doc: &Html, index: &mut StyleIndex) {
    let any = Selector::parse("[style]").unwrap();
    let mut ordinals: HashMap<String, usize> = HashMap::new();

    for el in doc.select(&any) {
        let style = match el.value().attr("style") {
            Some(s) if !s.trim().is_empty() => s,
            _ => continue,
        };
        let tag = el.value().name().to_lowercase();
        let key = if let Some(id) = el.value().attr("id") {
            id.to_string()
        } else {
            let classes: Vec<&str> = el.value().classes().collect();
            if !classes.is_empty() {
                format!("{}.{}", tag, classes.join("."))
            } else {
                let n = ordinals.entry(tag.clone()).or_insert(0);
                let key = format!("{}[{}]", tag, n);
                *n += 1;
                key
            }
        };
        index.inline_styles.insert(key, StyleMap::parse(style));
    }
}
