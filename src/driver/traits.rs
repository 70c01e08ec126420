use crate::driver::types::Query;
use crate::error::DriverError;

/// Capability surface over a live (or captured) page.
///
/// Node handles borrow the document and are only meaningful for the page state
/// they were found in; nothing here survives a navigation.
///
/// All operations run on the caller's thread and block until the backend
/// answers. Implementations must not cache query results.
pub trait Document {
    /// Handle to one element of the page
    type Node<'a>
    where
        Self: 'a;

    /// Elements matching `css`, in document order, under `scope` or the whole page
    fn select<'a>(
        &'a self,
        scope: Option<&Self::Node<'a>>,
        css: &str,
    ) -> Result<Vec<Self::Node<'a>>, DriverError>;

    /// Rendered text of the element
    fn text<'a>(&'a self, node: &Self::Node<'a>) -> Result<String, DriverError>;

    fn attribute<'a>(
        &'a self,
        node: &Self::Node<'a>,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Lower-case tag name
    fn tag_name<'a>(&'a self, node: &Self::Node<'a>) -> Result<String, DriverError>;

    fn is_displayed<'a>(&'a self, node: &Self::Node<'a>) -> Result<bool, DriverError>;

    /// Nearest inclusive ancestor matching `css`
    fn closest<'a>(
        &'a self,
        node: &Self::Node<'a>,
        css: &str,
    ) -> Result<Option<Self::Node<'a>>, DriverError>;

    /// Script-level click, not subject to hit-testing
    fn click<'a>(&'a self, node: &Self::Node<'a>) -> Result<(), DriverError>;

    /// Scroll the element into view and give it focus
    fn focus<'a>(&'a self, node: &Self::Node<'a>) -> Result<(), DriverError>;

    /// Empty an input's current value
    fn clear<'a>(&'a self, node: &Self::Node<'a>) -> Result<(), DriverError>;

    fn type_text<'a>(&'a self, node: &Self::Node<'a>, text: &str) -> Result<(), DriverError>;

    /// Press a named key (e.g. `"Enter"`) with the element focused
    fn press_key<'a>(&'a self, node: &Self::Node<'a>, key: &str) -> Result<(), DriverError>;

    /// Run an ad-hoc script against the page and return its JSON value
    fn execute_script(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    /// Force every element matching `css` invisible; returns how many were hit
    fn hide_matching(&self, css: &str) -> Result<usize, DriverError>;

    /// Pointer click at viewport coordinates
    fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError>;

    fn current_url(&self) -> Result<String, DriverError>;

    /// PNG bytes of the current page
    fn capture_screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// `select` narrowed by the query's text condition.
    ///
    /// Backends that can filter text natively should override this.
    fn query<'a>(
        &'a self,
        scope: Option<&Self::Node<'a>>,
        query: &Query,
    ) -> Result<Vec<Self::Node<'a>>, DriverError> {
        let nodes = self.select(scope, &query.css)?;
        if query.text.is_none() {
            return Ok(nodes);
        }

        let mut matched = Vec::new();
        for node in nodes {
            if query.matches_text(&self.text(&node)?) {
                matched.push(node);
            }
        }
        Ok(matched)
    }
}
