//! ページ遷移後の待機戦略

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::traits::{PageDriver, WaitStrategy};

/// ページ安定判定のインターバル
const STABLE_CHECK_INTERVAL_MS: u64 = 300;
/// 連続で同じ長さならOK
const REQUIRED_STABLE_CHECKS: u32 = 3;

/// 固定時間スリープ（ページの状態は見ない）
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl WaitStrategy for FixedDelay {
    async fn settle(&self, _page: &dyn PageDriver) {
        if !self.0.is_zero() {
            debug!("Sleeping {:?} for client-side rendering", self.0);
            sleep(self.0).await;
        }
    }
}

/// HTML長が安定するまで待機し、タイムアウトしたらそのまま続行
#[derive(Debug, Clone, Copy)]
pub struct StableDom {
    pub timeout: Duration,
    pub interval: Duration,
}

impl StableDom {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Duration::from_millis(STABLE_CHECK_INTERVAL_MS),
        }
    }
}

#[async_trait]
impl WaitStrategy for StableDom {
    async fn settle(&self, page: &dyn PageDriver) {
        let start = Instant::now();
        let mut last_len: Option<usize> = None;
        let mut stable_count = 0;

        while start.elapsed() < self.timeout {
            match page.content_length().await {
                Ok(len) => {
                    match last_len {
                        Some(last) if last == len => {
                            stable_count += 1;
                            if stable_count >= REQUIRED_STABLE_CHECKS {
                                info!(
                                    "Page stable after {:?} ({} consecutive checks)",
                                    start.elapsed(),
                                    stable_count
                                );
                                return;
                            }
                        }
                        _ => stable_count = 0,
                    }
                    last_len = Some(len);
                }
                Err(e) => {
                    debug!("Page stable check error: {}", e);
                    stable_count = 0;
                }
            }

            sleep(self.interval).await;
        }

        warn!(
            "Page stable timeout after {:?}, proceeding anyway",
            start.elapsed()
        );
    }
}
