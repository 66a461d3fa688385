use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// スクレイパーが必要とするページ操作
///
/// 本番は chromiumoxide の `ChromePage`、テストはスクリプト化した偽ページで実装する。
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// URLへ遷移
    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// 現在のページタイトル（タイトルなしは空文字）
    async fn title(&self) -> Result<String, ScraperError>;

    /// セレクタに一致する最初の要素のテキスト
    async fn text(&self, selector: &str) -> Result<String, ScraperError>;

    /// 要素が表示されるまでポーリングしてテキストを返す
    async fn wait_visible_text(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError>;

    /// ドキュメントのHTML長（ページ安定判定用）
    async fn content_length(&self) -> Result<usize, ScraperError>;

    /// 現在のウィンドウのPNG
    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError>;
}

/// ページ遷移後、抽出前の待機方法
#[async_trait]
pub trait WaitStrategy: Send + Sync {
    async fn settle(&self, page: &dyn PageDriver);
}

/// オペレーターの準備完了シグナル
#[async_trait]
pub trait OperatorSignal: Send + Sync {
    /// 準備完了までブロック
    async fn wait_ready(&self) -> Result<(), ScraperError>;
}
