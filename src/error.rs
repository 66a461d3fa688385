use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ブラウザ実行ファイルが見つかりません: {}", .0.display())]
    DriverNotFound(PathBuf),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("ページ構造エラー: {0}")]
    UnexpectedMarkup(String),

    #[error("入力ファイルが見つかりません: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("入力形式エラー: {0}")]
    MalformedInput(String),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel出力エラー: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("スクリーンショットエラー: {0}")]
    Screenshot(String),

    #[error("オペレーター入力エラー: {0}")]
    Operator(String),
}

impl ScraperError {
    /// スクレイピング開始前に中断すべきエラーか
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            ScraperError::MissingFile(_)
                | ScraperError::MalformedInput(_)
                | ScraperError::DriverNotFound(_)
                | ScraperError::Csv(_)
        )
    }
}
