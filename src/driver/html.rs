//! Static document backend over parsed HTML snapshots.
//!
//! Used for offline extraction from saved pages and as the fake page in tests.
//! A document holds one or more page states; clicking an element that matches a
//! registered transition switches to another state, which is enough to model
//! calendar paging and form submission. Every side effect is recorded.

use crate::driver::traits::Document;
use crate::driver::types::normalize_whitespace;
use crate::error::DriverError;
use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use tracing::debug;

fn parse_selector(css: &str) -> Result<Selector, DriverError> {
    Selector::parse(css).map_err(|e| DriverError::InvalidSelector {
        selector: css.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Short human-readable identity of an element, used in the interaction logs
fn describe(el: &ElementRef<'_>) -> String {
    let value = el.value();
    let mut out = value.name().to_string();
    if let Some(id) = value.attr("id") {
        out.push('#');
        out.push_str(id);
    }
    for attr in ["data-testid", "data-date", "name", "for"] {
        if let Some(v) = value.attr(attr) {
            out.push_str(&format!("[{attr}={v}]"));
        }
    }
    let text = normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "));
    if !text.is_empty() {
        out.push_str(&format!(" \"{text}\""));
    }
    out
}

fn inline_hidden(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value
        .attr("style")
        .map(|style| {
            let style: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
        .unwrap_or(false)
}

/// Parsed page snapshots with click-driven transitions between them
pub struct HtmlDocument {
    pages: Vec<Html>,
    current: Cell<usize>,
    url: String,
    transitions: Vec<(Selector, usize)>,
    hidden: RefCell<Vec<Selector>>,
    clicks: RefCell<Vec<String>>,
    typed: RefCell<Vec<(String, String)>>,
    keys: RefCell<Vec<String>>,
    scripts: RefCell<Vec<String>>,
    query_log: RefCell<Vec<String>>,
}

impl HtmlDocument {
    /// Single-state document
    pub fn new(html: &str) -> Self {
        Self::from_pages([html])
    }

    /// Multi-state document starting on the first page
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pages: Vec<Html> = pages
            .into_iter()
            .map(|p| Html::parse_document(p.as_ref()))
            .collect();
        if pages.is_empty() {
            pages.push(Html::parse_document(""));
        }

        Self {
            pages,
            current: Cell::new(0),
            url: "about:blank".to_string(),
            transitions: Vec::new(),
            hidden: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
            typed: RefCell::new(Vec::new()),
            keys: RefCell::new(Vec::new()),
            scripts: RefCell::new(Vec::new()),
            query_log: RefCell::new(Vec::new()),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Clicking an element matching `css` switches to page `target`
    pub fn on_click(mut self, css: &str, target: usize) -> Result<Self, DriverError> {
        if target >= self.pages.len() {
            return Err(DriverError::Script(format!(
                "transition target {target} out of range ({} pages)",
                self.pages.len()
            )));
        }
        self.transitions.push((parse_selector(css)?, target));
        Ok(self)
    }

    pub fn current_page(&self) -> usize {
        self.current.get()
    }

    /// Elements clicked so far, described as `tag#id[attr=value] "text"`
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    /// `(element, text)` pairs typed so far
    pub fn typed(&self) -> Vec<(String, String)> {
        self.typed.borrow().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.borrow().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }

    /// Every selector handed to `select`, in call order
    pub fn query_log(&self) -> Vec<String> {
        self.query_log.borrow().clone()
    }

    fn page(&self) -> &Html {
        &self.pages[self.current.get()]
    }

    fn hidden_by_rule(&self, el: &ElementRef<'_>) -> bool {
        self.hidden.borrow().iter().any(|s| s.matches(el))
    }
}

impl Document for HtmlDocument {
    type Node<'a> = ElementRef<'a>
    where
        Self: 'a;

    fn select<'a>(
        &'a self,
        scope: Option<&ElementRef<'a>>,
        css: &str,
    ) -> Result<Vec<ElementRef<'a>>, DriverError> {
        self.query_log.borrow_mut().push(css.to_string());
        let selector = parse_selector(css)?;
        let found = match scope {
            Some(root) => root
                .select(&selector)
                .filter(|el| el.id() != root.id())
                .collect(),
            None => self.page().select(&selector).collect(),
        };
        Ok(found)
    }

    fn text<'a>(&'a self, node: &ElementRef<'a>) -> Result<String, DriverError> {
        Ok(normalize_whitespace(
            &node.text().collect::<Vec<_>>().join(" "),
        ))
    }

    fn attribute<'a>(
        &'a self,
        node: &ElementRef<'a>,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(node.value().attr(name).map(str::to_string))
    }

    fn tag_name<'a>(&'a self, node: &ElementRef<'a>) -> Result<String, DriverError> {
        Ok(node.value().name().to_ascii_lowercase())
    }

    fn is_displayed<'a>(&'a self, node: &ElementRef<'a>) -> Result<bool, DriverError> {
        let chain = std::iter::once(*node).chain(node.ancestors().filter_map(ElementRef::wrap));
        for el in chain {
            if inline_hidden(&el) || self.hidden_by_rule(&el) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn closest<'a>(
        &'a self,
        node: &ElementRef<'a>,
        css: &str,
    ) -> Result<Option<ElementRef<'a>>, DriverError> {
        let selector = parse_selector(css)?;
        Ok(std::iter::once(*node)
            .chain(node.ancestors().filter_map(ElementRef::wrap))
            .find(|el| selector.matches(el)))
    }

    fn click<'a>(&'a self, node: &ElementRef<'a>) -> Result<(), DriverError> {
        let label = describe(node);
        debug!(target_element = %label, "click");
        self.clicks.borrow_mut().push(label);

        if let Some((_, target)) = self
            .transitions
            .iter()
            .find(|(selector, _)| selector.matches(node))
        {
            self.current.set(*target);
        }
        Ok(())
    }

    fn focus<'a>(&'a self, _node: &ElementRef<'a>) -> Result<(), DriverError> {
        Ok(())
    }

    fn clear<'a>(&'a self, _node: &ElementRef<'a>) -> Result<(), DriverError> {
        Ok(())
    }

    fn type_text<'a>(&'a self, node: &ElementRef<'a>, text: &str) -> Result<(), DriverError> {
        self.typed
            .borrow_mut()
            .push((describe(node), text.to_string()));
        Ok(())
    }

    fn press_key<'a>(&'a self, _node: &ElementRef<'a>, key: &str) -> Result<(), DriverError> {
        self.keys.borrow_mut().push(key.to_string());
        Ok(())
    }

    fn execute_script(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        self.scripts.borrow_mut().push(script.to_string());
        Ok(serde_json::Value::Null)
    }

    fn hide_matching(&self, css: &str) -> Result<usize, DriverError> {
        let selector = parse_selector(css)?;
        let hits = self.page().select(&selector).count();
        self.hidden.borrow_mut().push(selector);
        Ok(hits)
    }

    fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        self.clicks.borrow_mut().push(format!("pointer@{x},{y}"));
        Ok(())
    }

    fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.url.clone())
    }

    fn capture_screenshot(&self) -> Result<Vec<u8>, DriverError> {
        Err(DriverError::Unsupported("screenshot of a static snapshot"))
    }
}
