use scraper::{ElementRef, Html, Selector};

/// Candidate content regions, most specific first
pub const CONTENT_SELECTORS: &[&str] = &[
    ".notion-page-content",
    "main",
    "article",
    r#"[role="main"]"#,
    "#content",
    "body",
];

/// A candidate region must carry more than this many characters to be accepted
pub const MIN_REGION_CHARS: usize = 200;

/// Table cells, separated by a tab so adjacent cells stay apart
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Elements whose contents never count as page text
const NOISE_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "video", "audio", "canvas", "object",
    "embed", "template", "head",
];

/// Elements that end a line of text when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "aside", "nav", "li", "ul",
    "ol", "tr", "table", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "br", "hr",
    "dt", "dd", "figcaption",
];

/// Extracts the readable text of an HTML document
///
/// Each region in [`CONTENT_SELECTORS`] is tried in order and the first one
/// whose trimmed text exceeds [`MIN_REGION_CHARS`] wins. When none
/// qualifies the text of the whole document is returned, which may be empty.
pub fn extract_text(html: &str) -> String {
    extract_text_with(html, CONTENT_SELECTORS, MIN_REGION_CHARS)
}

/// Same as [`extract_text`] with an explicit selector list and threshold
pub fn extract_text_with(html: &str, selectors: &[&str], min_chars: usize) -> String {
    let doc = Html::parse_document(html);

    for sel_str in selectors {
        let Ok(selector) = Selector::parse(sel_str) else {
            ::log::warn!("Skipping invalid selector: {}", sel_str);
            continue;
        };

        if let Some(region) = doc.select(&selector).next() {
            let text = region_text(region);
            let len = text.trim().chars().count();
            ::log::trace!("Selector {} matched with {} chars", sel_str, len);
            if len > min_chars {
                ::log::debug!("Using content region {}", sel_str);
                return text;
            }
        }
    }

    ::log::debug!("No content region qualified, using whole document");
    region_text(doc.root_element())
}

/// Collects the text beneath `element`, skipping non-content nodes
pub fn region_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if NOISE_ELEMENTS.contains(&name) {
                continue;
            }
            collect_text(child_el, out);
            if BLOCK_ELEMENTS.contains(&name) {
                out.push('\n');
            } else if CELL_ELEMENTS.contains(&name) {
                out.push('\t');
            }
        }
    }
}
