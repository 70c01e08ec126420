//! Live document backend over a headless Chrome tab.
//!
//! Queries run as one injected script that returns a CSS path per match; each
//! path is then resolved to a protocol element. Text filtering happens inside
//! that script so a broad selector costs one round trip, not one per node.

use crate::driver::traits::Document;
use crate::driver::types::Query;
use crate::error::DriverError;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Launch Chrome with the given window size
pub fn launch_browser(headless: bool, width: u32, height: u32) -> Result<Browser, DriverError> {
    info!(headless, width, height, "Launching Chrome...");

    let options = LaunchOptions::default_builder()
        .headless(headless)
        .window_size(Some((width, height)))
        .build()
        .map_err(|e| DriverError::Browser(format!("failed to build launch options: {e}")))?;

    Ok(Browser::new(options)?)
}

/// Matches found by [`QUERY_JS`]
#[derive(Debug, Default, Deserialize)]
struct Matches {
    #[serde(default)]
    paths: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Scrollable document size, measured for full-page screenshots
#[derive(Debug, Default, Deserialize)]
struct PageSize {
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl PageSize {
    /// Clip covering the whole document, or `None` when nothing was measured
    fn clip(&self) -> Option<Viewport> {
        (self.width >= 1.0 && self.height >= 1.0).then(|| Viewport {
            x: 0.0,
            y: 0.0,
            width: self.width.ceil(),
            height: self.height.ceil(),
            scale: 1.0,
        })
    }
}

const PAGE_SIZE_JS: &str = "JSON.stringify({ \
    width: Math.max(document.documentElement.scrollWidth, window.innerWidth), \
    height: Math.max(document.documentElement.scrollHeight, window.innerHeight) })";

/// Shared helpers prepended to every injected function body
const HELPERS_JS: &str = r#"
    const cssPath = el => {
        const parts = [];
        let n = el;
        while (n && n.nodeType === 1) {
            if (n.id && document.querySelectorAll('#' + CSS.escape(n.id)).length === 1) {
                parts.unshift('#' + CSS.escape(n.id));
                break;
            }
            let s = n.tagName.toLowerCase();
            const p = n.parentElement;
            if (p) {
                const sibs = [...p.children].filter(c => c.tagName === n.tagName);
                if (sibs.length > 1) s += ':nth-of-type(' + (sibs.indexOf(n) + 1) + ')';
            }
            parts.unshift(s);
            n = p;
        }
        return parts.join(' > ');
    };
    const norm = e => (e.innerText || e.textContent || '').replace(/\s+/g, ' ').trim().toLowerCase();
"#;

/// `this` is the scope element or `document`
const QUERY_JS: &str = r#"
    try {
        const root = (this && this.querySelectorAll) ? this : document;
        let nodes = [...root.querySelectorAll(css)];
        if (mode === 'contains') nodes = nodes.filter(e => norm(e).includes(needle));
        if (mode === 'equals') nodes = nodes.filter(e => norm(e) === needle);
        return JSON.stringify({ paths: nodes.map(cssPath) });
    } catch (err) {
        return JSON.stringify({ error: String(err) });
    }
"#;

const CLOSEST_JS: &str = r#"
    try {
        const hit = this.closest(css);
        return JSON.stringify({ paths: hit ? [cssPath(hit)] : [] });
    } catch (err) {
        return JSON.stringify({ error: String(err) });
    }
"#;

const DISPLAYED_JS: &str = r#"function() {
    const s = window.getComputedStyle(this);
    const r = this.getBoundingClientRect();
    return s.display !== 'none' && s.visibility !== 'hidden' && (r.width > 0 || r.height > 0);
}"#;

const CLICK_JS: &str = "function() { this.click(); }";

const FOCUS_JS: &str = r#"function() {
    this.scrollIntoView({ block: 'center' });
    this.focus();
    this.click();
}"#;

const CLEAR_JS: &str = r#"function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// One browser tab seen through the [`Document`] surface
pub struct ChromeDocument {
    tab: Arc<Tab>,
}

impl ChromeDocument {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Open `url` in a fresh tab and wait for navigation to settle
    pub fn open(browser: &Browser, url: &str) -> Result<Self, DriverError> {
        info!(url, "Opening page in new tab");
        let tab = browser.new_tab()?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        Ok(Self { tab })
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    pub fn navigate(&self, url: &str) -> Result<(), DriverError> {
        info!(url, "Navigating");
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn run_matches<'a>(
        &'a self,
        scope: Option<&Element<'a>>,
        body: &str,
        args: [Value; 3],
    ) -> Result<Vec<Element<'a>>, DriverError> {
        let function = format!("function(css, mode, needle) {{ {HELPERS_JS} {body} }}");

        let remote = match scope {
            Some(el) => el.call_js_fn(&function, args.to_vec(), false)?,
            None => {
                let [css, mode, needle] = &args;
                let expression = format!("({function}).call(document, {css}, {mode}, {needle})");
                self.tab.evaluate(&expression, false)?
            }
        };

        let raw = remote
            .value
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Script("query script returned no value".to_string()))?;
        let matches: Matches = serde_json::from_str(raw)
            .map_err(|e| DriverError::Script(format!("unreadable query result: {e}")))?;

        if let Some(error) = matches.error {
            let css = args[0].as_str().unwrap_or_default().to_string();
            return Err(DriverError::InvalidSelector {
                selector: css,
                reason: error,
            });
        }

        let mut elements = Vec::with_capacity(matches.paths.len());
        for path in matches.paths {
            match self.tab.find_element(&path) {
                Ok(el) => elements.push(el),
                // The page re-rendered between the script and the lookup.
                Err(e) => debug!(path = %path, error = %e, "match vanished before lookup"),
            }
        }
        Ok(elements)
    }

    fn call<'a>(&'a self, node: &Element<'a>, function: &str) -> Result<Value, DriverError> {
        let remote = node.call_js_fn(function, vec![], false)?;
        Ok(remote.value.unwrap_or(Value::Null))
    }
}

impl Document for ChromeDocument {
    type Node<'a> = Element<'a>
    where
        Self: 'a;

    fn select<'a>(
        &'a self,
        scope: Option<&Element<'a>>,
        css: &str,
    ) -> Result<Vec<Element<'a>>, DriverError> {
        self.run_matches(scope, QUERY_JS, [json!(css), Value::Null, Value::Null])
    }

    fn query<'a>(
        &'a self,
        scope: Option<&Element<'a>>,
        query: &Query,
    ) -> Result<Vec<Element<'a>>, DriverError> {
        let (mode, needle) = match &query.text {
            Some(m) => {
                let (mode, needle) = m.as_js_args();
                (json!(mode), json!(needle))
            }
            None => (Value::Null, Value::Null),
        };
        self.run_matches(scope, QUERY_JS, [json!(query.css), mode, needle])
    }

    fn text<'a>(&'a self, node: &Element<'a>) -> Result<String, DriverError> {
        Ok(node.get_inner_text()?)
    }

    fn attribute<'a>(
        &'a self,
        node: &Element<'a>,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(node.get_attribute_value(name)?)
    }

    fn tag_name<'a>(&'a self, node: &Element<'a>) -> Result<String, DriverError> {
        Ok(node.tag_name.to_ascii_lowercase())
    }

    fn is_displayed<'a>(&'a self, node: &Element<'a>) -> Result<bool, DriverError> {
        Ok(self.call(node, DISPLAYED_JS)?.as_bool().unwrap_or(false))
    }

    fn closest<'a>(
        &'a self,
        node: &Element<'a>,
        css: &str,
    ) -> Result<Option<Element<'a>>, DriverError> {
        let mut found =
            self.run_matches(Some(node), CLOSEST_JS, [json!(css), Value::Null, Value::Null])?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.remove(0))
        })
    }

    fn click<'a>(&'a self, node: &Element<'a>) -> Result<(), DriverError> {
        self.call(node, CLICK_JS).map(|_| ())
    }

    fn focus<'a>(&'a self, node: &Element<'a>) -> Result<(), DriverError> {
        self.call(node, FOCUS_JS).map(|_| ())
    }

    fn clear<'a>(&'a self, node: &Element<'a>) -> Result<(), DriverError> {
        self.call(node, CLEAR_JS).map(|_| ())
    }

    fn type_text<'a>(&'a self, node: &Element<'a>, text: &str) -> Result<(), DriverError> {
        node.type_into(text)?;
        Ok(())
    }

    fn press_key<'a>(&'a self, node: &Element<'a>, key: &str) -> Result<(), DriverError> {
        node.focus()?;
        self.tab.press_key(key)?;
        Ok(())
    }

    fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        let remote = self.tab.evaluate(script, false)?;
        Ok(remote.value.unwrap_or(Value::Null))
    }

    fn hide_matching(&self, css: &str) -> Result<usize, DriverError> {
        let script = format!(
            "(() => {{ let n = 0; document.querySelectorAll({}).forEach(e => {{ \
             e.style.display = 'none'; e.style.visibility = 'hidden'; n++; }}); return n; }})()",
            json!(css)
        );
        let hidden = self.execute_script(&script)?;
        Ok(hidden.as_u64().unwrap_or(0) as usize)
    }

    fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        let script = format!(
            "(() => {{ const el = document.elementFromPoint({x}, {y}); \
             if (el) {{ for (const t of ['mousemove', 'mousedown', 'mouseup', 'click']) \
             el.dispatchEvent(new MouseEvent(t, {{ bubbles: true, clientX: {x}, clientY: {y} }})); }} }})()"
        );
        self.execute_script(&script).map(|_| ())
    }

    fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.tab.get_url())
    }

    fn capture_screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let size: PageSize = self
            .execute_script(PAGE_SIZE_JS)?
            .as_str()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        let clip = size.clip();
        if clip.is_none() {
            debug!("Page size unavailable; capturing the viewport only");
        }
        Ok(self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, clip, true)?)
    }
}
