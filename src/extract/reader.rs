//! Field Reader: best-effort values out of a document node.
//!
//! Every traversal step here returns an `Option`. A [`Chain`] is an ordered
//! list of (locator, pick) steps; the first step whose locator matches *and*
//! whose picked value is present wins. A chain only becomes readable once it
//! is terminated with a default ([`Chain::or`]) or explicitly declared
//! optional ([`Chain::optional`]), so reading a field can never fail.

use scraper::{ElementRef, Selector};
use url::Url;

/// Parses a CSS selector that is a compile-time literal.
///
/// Panics on invalid CSS. Only reachable through [`selector!`](crate::selector),
/// whose statics are all exercised by the unit tests.
pub fn css(source: &'static str) -> Selector {
    match Selector::parse(source) {
        Ok(selector) => selector,
        Err(err) => panic!("invalid selector {source:?}: {err}"),
    }
}

/// A `&'static Selector` parsed once on first use.
#[macro_export]
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: ::std::sync::LazyLock<::scraper::Selector> =
            ::std::sync::LazyLock::new(|| $crate::extract::reader::css($css));
        &*SELECTOR
    }};
}

/// Joins trimmed, non-empty text fragments with single spaces.
pub fn clean_text<'a>(text_iter: impl Iterator<Item = &'a str>) -> String {
    let mut buffer = String::with_capacity(64);
    for part in text_iter {
        for word in part.split_whitespace() {
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(word);
        }
    }
    buffer
}

/// Whitespace-normalised text content of an element.
pub fn text(element: ElementRef<'_>) -> String {
    clean_text(element.text())
}

/// Text content, or `None` when the element has none.
pub fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    Some(text(element)).filter(|t| !t.is_empty())
}

/// Trimmed attribute value, or `None` when missing or blank.
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Image source preferring the lazy-loading attribute.
pub fn lazy_src(img: ElementRef<'_>) -> Option<String> {
    attr(img, "data-src").or_else(|| attr(img, "src"))
}

pub fn first<'a>(node: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    node.select(selector).next()
}

pub fn first_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(node, selector).and_then(non_empty_text)
}

pub fn first_attr(node: ElementRef<'_>, selector: &Selector, name: &str) -> Option<String> {
    first(node, selector).and_then(|el| attr(el, name))
}

/// Text of the first element matching `selector` whose text contains `needle`.
pub fn text_containing(node: ElementRef<'_>, selector: &Selector, needle: &str) -> Option<String> {
    node.select(selector).map(text).find(|t| t.contains(needle))
}

/// Text content with every `<br>` turned into `separator`.
pub fn text_with_breaks(element: ElementRef<'_>, separator: &str) -> String {
    let mut lines = vec![String::new()];
    for node in element.descendants() {
        if let Some(fragment) = node.value().as_text() {
            if let Some(line) = lines.last_mut() {
                line.push_str(fragment);
                line.push(' ');
            }
        } else if node.value().as_element().is_some_and(|el| el.name() == "br") {
            lines.push(String::new());
        }
    }
    lines
        .iter()
        .map(|line| clean_text(std::iter::once(line.as_str())))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Resolves `href` against `base`; an unparseable base leaves `href` as is.
pub fn absolute_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Where a step looks, relative to the node being read.
#[derive(Clone, Copy)]
pub enum Locate {
    /// The node itself.
    Node,
    /// The first descendant matching a selector.
    Css(&'static Selector),
}

/// What a step takes from the located element.
#[derive(Clone, Copy)]
pub enum Pick {
    Text,
    Attr(&'static str),
    /// Arbitrary traversal from the located element.
    With(fn(ElementRef<'_>) -> Option<String>),
}

#[derive(Clone, Copy)]
struct Step {
    locate: Locate,
    pick: Pick,
}

impl Step {
    fn apply(&self, node: ElementRef<'_>) -> Option<String> {
        let element = match self.locate {
            Locate::Node => node,
            Locate::Css(selector) => first(node, selector)?,
        };
        match self.pick {
            Pick::Text => non_empty_text(element),
            Pick::Attr(name) => attr(element, name),
            Pick::With(f) => f(element),
        }
    }
}

/// An unterminated selector chain.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Step>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, locate: Locate, pick: Pick) -> Self {
        self.steps.push(Step { locate, pick });
        self
    }

    pub fn text(self, selector: &'static Selector) -> Self {
        self.step(Locate::Css(selector), Pick::Text)
    }

    pub fn attr(self, selector: &'static Selector, name: &'static str) -> Self {
        self.step(Locate::Css(selector), Pick::Attr(name))
    }

    pub fn own_attr(self, name: &'static str) -> Self {
        self.step(Locate::Node, Pick::Attr(name))
    }

    pub fn with(self, selector: &'static Selector, f: fn(ElementRef<'_>) -> Option<String>) -> Self {
        self.step(Locate::Css(selector), Pick::With(f))
    }

    fn lookup(&self, node: Option<ElementRef<'_>>) -> Option<String> {
        let node = node?;
        self.steps.iter().find_map(|step| step.apply(node))
    }

    /// Terminates the chain with a declared default value.
    pub fn or(self, default: &'static str) -> Field {
        Field {
            chain: self,
            default,
        }
    }

    /// Terminates the chain with absence as its default.
    pub fn optional(self) -> OptionalField {
        OptionalField { chain: self }
    }
}

/// A chain that falls back to a fixed string.
#[derive(Clone)]
pub struct Field {
    chain: Chain,
    default: &'static str,
}

impl Field {
    pub fn read(&self, node: Option<ElementRef<'_>>) -> String {
        self.chain
            .lookup(node)
            .unwrap_or_else(|| self.default.to_string())
    }
}

/// A chain whose default is `None`.
#[derive(Clone)]
pub struct OptionalField {
    chain: Chain,
}

impl OptionalField {
    pub fn read(&self, node: Option<ElementRef<'_>>) -> Option<String> {
        self.chain.lookup(node)
    }
}

/// The labelled value of an information sidebar, e.g.
/// `<div><span class="dark_text">Status:</span> Finished Airing</div>`.
///
/// The value is the first non-blank text sibling after the label, or the
/// text of a link that directly follows it.
pub fn labelled_value(block: ElementRef<'_>, label_selector: &Selector, label: &str) -> Option<String> {
    let label_el = find_label(block, label_selector, label)?;
    for sibling in label_el.next_siblings() {
        if let Some(fragment) = sibling.value().as_text() {
            let value = clean_text(std::iter::once(&**fragment));
            if !value.is_empty() {
                return Some(value);
            }
        } else if let Some(element) = ElementRef::wrap(sibling) {
            return match element.value().name() {
                "a" => non_empty_text(element),
                _ => None,
            };
        }
    }
    None
}

/// All `<a>` siblings that follow a label, as (text, href) pairs.
pub fn labelled_links(
    block: ElementRef<'_>,
    label_selector: &Selector,
    label: &str,
) -> Vec<(String, Option<String>)> {
    let Some(label_el) = find_label(block, label_selector, label) else {
        return Vec::new();
    };
    label_el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|a| non_empty_text(a).map(|t| (t, attr(a, "href"))))
        .collect()
}

fn find_label<'a>(block: ElementRef<'a>, label_selector: &Selector, label: &str) -> Option<ElementRef<'a>> {
    block
        .select(label_selector)
        .find(|el| text(*el).contains(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn doc(html: &str) -> Html {
        Html::parse_fragment(html)
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let html = doc("<p>  Hello \n  <b>big</b>\tworld  </p>");
        let p = first(html.root_element(), selector!("p")).unwrap();
        assert_eq!(text(p), "Hello big world");
    }

    #[test]
    fn test_chain_falls_through_to_next_step() {
        let html = doc(r#"<div class="row"><img src="/small.jpg"><span class="score"></span></div>"#);
        let row = first(html.root_element(), selector!("div.row"));
        let image = Chain::new()
            .attr(selector!("img"), "data-src")
            .attr(selector!("img"), "src")
            .or("N/A");
        assert_eq!(image.read(row), "/small.jpg");

        // located but empty counts as no match
        let score = Chain::new().text(selector!("span.score")).or("N/A");
        assert_eq!(score.read(row), "N/A");
    }

    #[test]
    fn test_chain_absent_node_yields_default() {
        let title = Chain::new().text(selector!("h2")).or("N/A");
        assert_eq!(title.read(None), "N/A");
        let link = Chain::new().attr(selector!("a"), "href").optional();
        assert_eq!(link.read(None), None);
    }

    #[test]
    fn test_reading_is_idempotent() {
        let html = doc(r#"<div><a href="/x">X</a></div>"#);
        let node = first(html.root_element(), selector!("div"));
        let field = Chain::new().text(selector!("a")).or("-");
        assert_eq!(field.read(node), field.read(node));
    }

    #[test]
    fn test_own_attr_and_custom_pick() {
        let html = doc(r#"<a class="t" href="/anime/1" title="Hero"><span>one</span><span>two</span></a>"#);
        let a = first(html.root_element(), selector!("a.t"));
        assert_eq!(Chain::new().own_attr("title").or("").read(a), "Hero");
        let last_span = Chain::new()
            .with(selector!("span"), |el| {
                el.next_siblings().filter_map(ElementRef::wrap).last().and_then(non_empty_text)
            })
            .or("none");
        assert_eq!(last_span.read(a), "two");
    }

    #[test]
    fn test_labelled_value_prefers_text_then_link() {
        let html = doc(
            r#"<div id="side">
                <div class="spaceit_pad"><span class="dark_text">Type:</span> <a href="/type/tv">TV</a></div>
                <div class="spaceit_pad"><span class="dark_text">Episodes:</span>
                    12
                </div>
                <div class="spaceit_pad"><span class="dark_text">Status:</span> <b>hidden</b></div>
            </div>"#,
        );
        let side = first(html.root_element(), selector!("#side")).unwrap();
        let label = selector!("span.dark_text");
        assert_eq!(labelled_value(side, label, "Type:").as_deref(), Some("TV"));
        assert_eq!(labelled_value(side, label, "Episodes:").as_deref(), Some("12"));
        assert_eq!(labelled_value(side, label, "Status:"), None);
        assert_eq!(labelled_value(side, label, "Rating:"), None);
    }

    #[test]
    fn test_labelled_links_collects_following_anchors() {
        let html = doc(
            r#"<div><span class="dark_text">Genres:</span>
                <span style="display:none">Action</span><a href="/g/1">Action</a>,
                <a href="/g/2">Drama</a></div>"#,
        );
        let links = labelled_links(html.root_element(), selector!("span.dark_text"), "Genres:");
        assert_eq!(
            links,
            vec![
                ("Action".to_string(), Some("/g/1".to_string())),
                ("Drama".to_string(), Some("/g/2".to_string())),
            ]
        );
    }

    #[test]
    fn test_text_containing() {
        let html = doc("<table><tr><th>Pressure: </th><td>1015 mbar</td></tr><tr><th>Humidity: </th><td>80%</td></tr></table>");
        let row = text_containing(html.root_element(), selector!("tr"), "Humidity:");
        assert_eq!(row.as_deref(), Some("Humidity: 80%"));
        assert_eq!(text_containing(html.root_element(), selector!("tr"), "Wind:"), None);
    }

    #[test]
    fn test_text_with_breaks() {
        let html = doc(r#"<div class="v"><a href="/x">Peter Parker</a><br>Spider-Man<br/> <small>Spidey</small></div>"#);
        let value = first(html.root_element(), selector!("div.v")).unwrap();
        assert_eq!(text_with_breaks(value, ", "), "Peter Parker, Spider-Man, Spidey");
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://myanimelist.net", "/character/1/Spike"),
            "https://myanimelist.net/character/1/Spike"
        );
        assert_eq!(
            absolute_url("https://myanimelist.net", "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(absolute_url("not a url", "/x"), "/x");
    }
}
