use crate::{Error, PageDriver, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::page::Page;
use futures::StreamExt;
use roost_core::CookieRecord;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_RETRIES: u32 = 5;

/// chromiumoxide-backed page driver connected to a remote browser endpoint
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl CdpDriver {
    /// Connect to the remote browser and take over its first page.
    ///
    /// The endpoint may not accept connections immediately, so the attempt
    /// is retried a bounded number of times.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        tracing::info!("Connecting to remote browser");

        let (browser, mut handler) = {
            let mut retries = CONNECT_RETRIES;
            loop {
                tracing::debug!("Attempting CDP connection...");
                match Browser::connect(ws_url).await {
                    Ok(result) => {
                        tracing::info!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to browser after {} attempts: {}",
                                CONNECT_RETRIES, e
                            )));
                        }
                        tracing::info!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        };

        // The handler must be polled for any browser command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        // Give the remote browser a moment to surface its initial page
        tokio::time::sleep(Duration::from_millis(500)).await;

        let page = if let Some(page) = browser.pages().await?.first() {
            tracing::debug!("Using existing page");
            page.clone()
        } else {
            tracing::debug!("No existing pages, creating new page");
            browser.new_page("about:blank").await?
        };

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "Navigating");
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        tracing::debug!(selector, "Clicking");
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        tracing::debug!(selector, chars = text.len(), "Typing");
        let element = self.page.find_element(selector).await?;
        // Click to focus before typing
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        tracing::debug!(selector, key, "Pressing key");
        let element = self.page.find_element(selector).await?;
        element.press_key(key).await?;
        Ok(())
    }

    async fn set_input_files(&self, selector: &str, path: &Path) -> Result<()> {
        tracing::debug!(selector, path = %path.display(), "Attaching file");
        let element = self.page.find_element(selector).await?;
        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(Error::Cdp)?;
        self.page.execute(params).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll_interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::Browser(format!(
                    "Timed out waiting for element '{}' after {}ms",
                    selector,
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn eval_bool(&self, script: &str) -> Result<bool> {
        let value = self.page.evaluate(script).await?.into_value::<bool>()?;
        Ok(value)
    }

    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        let cookies = self.page.get_cookies().await?;
        // CDP cookie types serialize to the same camelCase shape the cookie
        // file stores, so conversion goes through serde_json
        let value = serde_json::to_value(&cookies)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_cookies(&self, cookies: Vec<CookieRecord>) -> Result<()> {
        let value = serde_json::to_value(&cookies)?;
        let params: Vec<CookieParam> = serde_json::from_value(value)?;
        tracing::info!(count = params.len(), "Injecting cookies into browser context");
        self.page.set_cookies(params).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        tracing::info!("Closing browser session");
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Error closing browser: {}", e);
        }
        self.handler_task.abort();
        Ok(())
    }
}
