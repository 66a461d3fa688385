//! Chausson 商品ページのスクレイパー
//!
//! 1商品ずつページを開き、5項目を抽出する。失敗はすべて `ScrapeResult` に変換し、
//! 呼び出し元へエラーを返さない。

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{PageDriver, WaitStrategy};
use crate::wait::FixedDelay;

use super::types::{ArticleRecord, ProductInfo, ScrapeResult};

pub const PRICE_SELECTOR: &str = "div.prix-principal price";
pub const NAME_SELECTOR: &str = "h1";
pub const UNIT_SELECTOR: &str = "div.qty-unit";
pub const REFERENCE_SELECTOR: &str = ".product-reference.mb-1";
pub const DEPOT_SELECTOR: &str = "div.agence-selected";

const CURRENCY_SYMBOL: char = '€';
/// 「Réf : 123456」の3語目がコード
const REFERENCE_WORD_INDEX: usize = 2;

/// 商品ページスクレイパー
pub struct ArticleScraper {
    wait: Box<dyn WaitStrategy>,
    depot_timeout: Duration,
    not_found_title: String,
    debug: bool,
}

impl ArticleScraper {
    pub fn new(wait: Box<dyn WaitStrategy>, not_found_title: impl Into<String>) -> Self {
        Self {
            wait,
            depot_timeout: Duration::from_secs(10),
            not_found_title: not_found_title.into(),
            debug: false,
        }
    }

    /// 設定から作成（固定待機）
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            Box::new(FixedDelay(config.settle_wait)),
            config.not_found_title.clone(),
        )
        .with_depot_timeout(config.depot_timeout)
        .with_debug(config.debug)
    }

    pub fn with_depot_timeout(mut self, timeout: Duration) -> Self {
        self.depot_timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// 1商品をスクレイプ
    pub async fn scrape(&self, page: &dyn PageDriver, article: &ArticleRecord) -> ScrapeResult {
        match self.extract(page, article.url()).await {
            Ok(Some(info)) => {
                debug!("Scraped {}: {:?}", article.code(), info);
                ScrapeResult::Scraped(info)
            }
            Ok(None) => {
                info!("Page not found for {}: {}", article.code(), article.url());
                ScrapeResult::InvalidUrl
            }
            Err(e) => {
                warn!("Scrape failed for {}: {}", article.code(), e);
                if self.debug {
                    self.log_debug_screenshot(page).await;
                }
                ScrapeResult::Failed(e.to_string())
            }
        }
    }

    /// `Ok(None)` は「ページが見つかりません」
    async fn extract(
        &self,
        page: &dyn PageDriver,
        url: &str,
    ) -> Result<Option<ProductInfo>, ScraperError> {
        page.goto(url).await?;
        self.wait.settle(page).await;

        if page.title().await? == self.not_found_title {
            return Ok(None);
        }

        let price_text = page.text(PRICE_SELECTOR).await?;
        let price = price_text
            .split(CURRENCY_SYMBOL)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let name = page.text(NAME_SELECTOR).await?;
        let unit = page.text(UNIT_SELECTOR).await?;

        let reference_text = page.text(REFERENCE_SELECTOR).await?;
        let reference_code = reference_text
            .split_whitespace()
            .nth(REFERENCE_WORD_INDEX)
            .ok_or_else(|| {
                ScraperError::UnexpectedMarkup(format!(
                    "no reference code in {:?}",
                    reference_text
                ))
            })?
            .to_string();

        let depot_text = page
            .wait_visible_text(DEPOT_SELECTOR, self.depot_timeout)
            .await?;
        let depot = depot_text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Some(ProductInfo {
            reference_code,
            depot,
            name,
            price,
            unit,
        }))
    }

    async fn log_debug_screenshot(&self, page: &dyn PageDriver) {
        if let Ok(screenshot) = page.screenshot().await {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("Failure screenshot: data:image/png;base64,{}", encoded);
        }
    }
}
