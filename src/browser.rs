//! chromiumoxide によるブラウザセッション

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::PageDriver;

/// 可視判定のポーリング間隔（ミリ秒）
const VISIBLE_POLL_INTERVAL_MS: u64 = 250;

/// 1回の実行で使うブラウザ。`close` は何度呼んでもよい
pub struct BrowserSession {
    browser_path: PathBuf,
    headless: bool,
    browser: Option<Browser>,
    page: Option<ChromePage>,
    handler_task: Option<JoinHandle<()>>,
}

impl BrowserSession {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            browser_path: config.browser_path.clone(),
            headless: config.headless,
            browser: None,
            page: None,
            handler_task: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.browser.is_some()
    }

    /// ブラウザを起動して最大化したウィンドウを1枚開く
    pub async fn open(&mut self) -> Result<&ChromePage, ScraperError> {
        if self.browser.is_some() {
            return self.page();
        }

        if !self.browser_path.exists() {
            return Err(ScraperError::DriverNotFound(self.browser_path.clone()));
        }

        info!("Launching browser from {:?}...", self.browser_path);

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.browser_path)
            .viewport(None)
            .arg("--log-level=3")
            .arg("--disable-search-engine-choice-screen")
            .arg("--start-maximized");

        if !self.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("browser config error: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let new_page = browser.new_page("about:blank").await;

        // 以降の失敗でも close() でプロセスとハンドラを片付けられるようにする
        self.browser = Some(browser);
        self.handler_task = Some(handler_task);

        let page = match new_page {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to open initial page: {}", e);
                self.close().await;
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };
        self.page = Some(ChromePage { page });

        info!("Browser loaded from: {:?}", self.browser_path);
        self.page()
    }

    pub fn page(&self) -> Result<&ChromePage, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("browser is not open".into()))
    }

    /// ブラウザを終了。未起動・終了済みなら何もしない
    pub async fn close(&mut self) {
        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            info!("Closing browser...");
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// chromiumoxide の `Page` を `PageDriver` として使う
pub struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn title(&self) -> Result<String, ScraperError> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ScraperError::Navigation(format!("page title: {}", e)))?;
        Ok(title.unwrap_or_default())
    }

    async fn text(&self, selector: &str) -> Result<String, ScraperError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| ScraperError::UnexpectedMarkup(format!("{}: {}", selector, e)))?;
        Ok(text.unwrap_or_default())
    }

    async fn wait_visible_text(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError> {
        let selector_literal = format!("{:?}", selector);
        let script = format!(
            r#"
            (function() {{
                var el = document.querySelector({});
                if (!el) return null;
                var style = window.getComputedStyle(el);
                if (style.visibility === 'hidden' || style.display === 'none') return null;
                if (el.getClientRects().length === 0) return null;
                return el.innerText;
            }})()
            "#,
            selector_literal
        );

        let start = Instant::now();
        loop {
            match self.page.evaluate(script.as_str()).await {
                Ok(result) => {
                    if let Ok(Some(text)) = result.into_value::<Option<String>>() {
                        debug!("{} visible after {:?}", selector, start.elapsed());
                        return Ok(text);
                    }
                }
                Err(e) => debug!("Visibility check error for {}: {}", selector, e),
            }

            if start.elapsed() > timeout {
                return Err(ScraperError::Timeout(format!(
                    "{} not visible after {:?}",
                    selector, timeout
                )));
            }

            sleep(Duration::from_millis(VISIBLE_POLL_INTERVAL_MS)).await;
        }
    }

    async fn content_length(&self) -> Result<usize, ScraperError> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML.length")
            .await
            .map_err(|e| ScraperError::UnexpectedMarkup(e.to_string()))?;
        result
            .into_value::<usize>()
            .map_err(|e| ScraperError::UnexpectedMarkup(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.page
            .screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(|e| ScraperError::Screenshot(e.to_string()))
    }
}
