use crate::Result;
use async_trait::async_trait;
use roost_core::CookieRecord;
use std::path::Path;
use std::time::Duration;

/// Low-level page operations the posting session is written against.
///
/// `CdpDriver` implements this over chromiumoxide; tests substitute a mock
/// so the posting sequence can be exercised without a browser.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the load to settle
    async fn goto(&self, url: &str) -> Result<()>;

    /// Click the element matching a CSS selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Focus the element matching a CSS selector and type into it
    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Press a key (e.g. "Enter") on the element matching a CSS selector
    async fn press_key(&self, selector: &str, key: &str) -> Result<()>;

    /// Attach a local file to the file input matching a CSS selector
    async fn set_input_files(&self, selector: &str, path: &Path) -> Result<()>;

    /// Wait until an element matching the selector appears
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Evaluate a JavaScript expression returning a boolean page-state check
    async fn eval_bool(&self, script: &str) -> Result<bool>;

    /// Read all cookies from the browser context
    async fn cookies(&self) -> Result<Vec<CookieRecord>>;

    /// Inject cookies into the browser context
    async fn set_cookies(&self, cookies: Vec<CookieRecord>) -> Result<()>;

    /// Release the browser session
    async fn close(&mut self) -> Result<()>;
}
