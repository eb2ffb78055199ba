use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use url::Url;

pub const MAX_BODY_CHARS: usize = 800;
const UNTITLED: &str = "Untitled";
const DATE_NOT_FOUND: &str = "Date not found";
const CONTENT_NOT_FOUND: &str = "Content not found";

/// Which links on a listing page point at individual articles.
#[derive(Debug, Clone)]
pub struct LinkRule {
    section: String,
    min_slashes: usize,
}

impl LinkRule {
    /// Portal-wide news: `.../noticias/<slug>`.
    pub fn portal() -> Self {
        Self { section: "/noticias/".into(), min_slashes: 5 }
    }

    /// One campus' news: `.../<campus>/noticias/<slug>`.
    pub fn campus(slug: &str) -> Self {
        Self { section: format!("/{slug}/noticias/"), min_slashes: 6 }
    }

    pub fn accepts(&self, url: &str) -> bool {
        if url.contains('#') || url.ends_with("/noticias/") || url.contains("/noticias/page/") {
            return false;
        }
        if url.contains("/categoria/") || url.contains("/tag/") {
            return false;
        }
        url.contains(&self.section) && url.matches('/').count() >= self.min_slashes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub published_at: String,
    pub modified_at: String,
    pub body: String,
}

struct Selectors {
    og_title: Selector,
    post_title: Selector,
    legacy_title: Selector,
    title: Selector,
    published: Selector,
    updated: Selector,
    content: Selector,
    p: Selector,
    a: Selector,
}

impl Selectors {
    fn new() -> Self {
        let parse = |s: &str| Selector::parse(s).expect("valid selector");
        Self {
            og_title: parse(r#"meta[property="og:title"]"#),
            post_title: parse("h1.post__title"),
            legacy_title: parse("h1.documentFirstHeading"),
            title: parse("title"),
            published: parse("span.post__published"),
            updated: parse("span.post__updated"),
            content: parse("div.post__content"),
            p: parse("p"),
            a: parse("a[href]"),
        }
    }
}

/// Article links on a listing page, resolved and de-duplicated in page order.
pub fn article_links(page: &Url, html: &str, rule: &LinkRule) -> Vec<String> {
    let sel = Selectors::new();
    let doc = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();
    for a in doc.select(&sel.a) {
        let Some(href) = a.value().attr("href") else { continue };
        let Ok(resolved) = page.join(href) else { continue };
        let resolved = resolved.to_string();
        if rule.accepts(&resolved) && !links.contains(&resolved) {
            links.push(resolved);
        }
    }
    links
}

/// Pull title, dates and lead paragraph out of an article page.
///
/// With `fold` set, title and body are accent-folded and lower-cased.
pub fn extract_article(url: &str, html: &str, fold: bool) -> Article {
    let sel = Selectors::new();
    let doc = Html::parse_document(html);

    let title = doc
        .select(&sel.og_title)
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| first_text(&doc, &sel.post_title))
        .or_else(|| first_text(&doc, &sel.legacy_title))
        .or_else(|| first_text(&doc, &sel.title))
        .unwrap_or_else(|| UNTITLED.to_string());

    let published_at = first_text(&doc, &sel.published)
        .or_else(|| text_node_containing(&doc, "publicado"))
        .unwrap_or_else(|| DATE_NOT_FOUND.to_string());
    let modified_at = first_text(&doc, &sel.updated)
        .or_else(|| text_node_containing(&doc, "modifica"))
        .unwrap_or_else(|| DATE_NOT_FOUND.to_string());

    // first paragraph of the first content block, even when empty
    let body = doc
        .select(&sel.content)
        .next()
        .and_then(|content| content.select(&sel.p).next())
        .or_else(|| doc.select(&sel.p).next())
        .map(element_text)
        .unwrap_or_else(|| CONTENT_NOT_FOUND.to_string());
    let body = truncate_body(&body);

    let (title, body) = if fold { (fold_text(&title), fold_text(&body)) } else { (title, body) };
    Article { url: url.to_string(), title, published_at, modified_at, body }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).next().map(element_text).filter(|t| !t.is_empty())
}

fn text_node_containing(doc: &Html, needle: &str) -> Option<String> {
    doc.root_element()
        .descendants()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| text.to_lowercase().contains(needle))
        .map(str::to_string)
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Strip diacritics and lower-case: "Inscrições" -> "inscricoes".
pub fn fold_text(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
}
