//! テスト用の偽ページと一時ディレクトリ

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use calamine::{open_workbook, Reader, Xlsx};

use crate::chausson::{
    DEPOT_SELECTOR, NAME_SELECTOR, PRICE_SELECTOR, REFERENCE_SELECTOR, UNIT_SELECTOR,
};
use crate::error::ScraperError;
use crate::traits::{OperatorSignal, PageDriver};

/// 1ページ分の内容
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeContent {
    pub title: String,
    pub texts: HashMap<String, String>,
    pub visible: HashMap<String, String>,
}

impl FakeContent {
    pub fn product(name: &str, price: &str, unit: &str, reference: &str, depot: &str) -> Self {
        let texts = [
            (PRICE_SELECTOR, price),
            (NAME_SELECTOR, name),
            (UNIT_SELECTOR, unit),
            (REFERENCE_SELECTOR, reference),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let visible = [(DEPOT_SELECTOR.to_string(), depot.to_string())]
            .into_iter()
            .collect();

        Self {
            title: format!("{} | Chausson", name),
            texts,
            visible,
        }
    }

    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn without(mut self, selector: &str) -> Self {
        self.texts.remove(selector);
        self.visible.remove(selector);
        self
    }
}

/// URLごとにスクリプト化した `PageDriver`
#[derive(Default)]
pub(crate) struct FakePage {
    pages: HashMap<String, FakeContent>,
    current: Mutex<Option<String>>,
    visited: Mutex<Vec<String>>,
    lengths: Mutex<VecDeque<usize>>,
    growing_length: bool,
    length_reads: AtomicUsize,
    screenshot_fails: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, content: FakeContent) -> Self {
        self.pages.insert(url.to_string(), content);
        self
    }

    pub fn with_lengths(self, lengths: Vec<usize>) -> Self {
        *self.lengths.lock().unwrap() = lengths.into();
        self
    }

    pub fn with_growing_length(mut self) -> Self {
        self.growing_length = true;
        self
    }

    pub fn with_failing_screenshot(mut self) -> Self {
        self.screenshot_fails = true;
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn length_reads(&self) -> usize {
        self.length_reads.load(Ordering::SeqCst)
    }

    fn current_page(&self) -> Result<FakeContent, ScraperError> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .ok_or_else(|| ScraperError::Navigation("no page loaded".into()))
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.visited.lock().unwrap().push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(ScraperError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            )));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn title(&self) -> Result<String, ScraperError> {
        Ok(self.current_page()?.title)
    }

    async fn text(&self, selector: &str) -> Result<String, ScraperError> {
        self.current_page()?
            .texts
            .get(selector)
            .cloned()
            .ok_or_else(|| ScraperError::ElementNotFound(selector.to_string()))
    }

    async fn wait_visible_text(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError> {
        self.current_page()?
            .visible
            .get(selector)
            .cloned()
            .ok_or_else(|| {
                ScraperError::Timeout(format!("{} not visible after {:?}", selector, timeout))
            })
    }

    async fn content_length(&self) -> Result<usize, ScraperError> {
        let reads = self.length_reads.fetch_add(1, Ordering::SeqCst);
        if self.growing_length {
            return Ok(reads * 100);
        }
        Ok(self.lengths.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        if self.screenshot_fails {
            return Err(ScraperError::Screenshot("target closed".into()));
        }
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }
}

/// 常に準備完了を返し、呼ばれた回数を数える
#[derive(Default)]
pub(crate) struct CountingSignal {
    pub calls: AtomicUsize,
}

#[async_trait]
impl OperatorSignal for CountingSignal {
    async fn wait_ready(&self) -> Result<(), ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// テストごとにユニークな一時ディレクトリを作成
pub(crate) fn temp_dir(label: &str) -> PathBuf {
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let dir = std::env::temp_dir().join(format!("chausson-{}-{}", label, unique_id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// 出力xlsxの1枚目のシートを文字列の行として読む
pub(crate) fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
