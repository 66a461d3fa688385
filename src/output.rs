//! 出力フォルダ・スクリーンショット・Excel出力

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::chausson::ArticleRecord;
use crate::error::ScraperError;
use crate::traits::PageDriver;

const FOLDER_PREFIX: &str = "Scraping_Chausson";
const EXPORT_PREFIX: &str = "Résultat_Scraping_Chausson";
const SCREENSHOT_DIR: &str = "screenshots";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%Hh%M.%S";

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 実行ごとの出力フォルダ（screenshots サブフォルダ付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFolder {
    root: PathBuf,
}

impl OutputFolder {
    /// `<output_dir>/Scraping_Chausson_<timestamp>` を作成
    pub fn create(output_dir: impl AsRef<Path>) -> Result<Self, ScraperError> {
        Self::create_named(output_dir, &format!("{}_{}", FOLDER_PREFIX, timestamp()))
    }

    /// 同名フォルダがあれば `-2`, `-3`, ... を付ける
    fn create_named(output_dir: impl AsRef<Path>, name: &str) -> Result<Self, ScraperError> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let mut root = output_dir.join(name);
        let mut suffix = 1;
        loop {
            match std::fs::create_dir(&root) {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    suffix += 1;
                    root = output_dir.join(format!("{}-{}", name, suffix));
                }
                Err(e) => return Err(e.into()),
            }
        }

        std::fs::create_dir_all(root.join(SCREENSHOT_DIR))?;
        info!("Output folder: {:?}", root);
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn screenshots(&self) -> PathBuf {
        self.root.join(SCREENSHOT_DIR)
    }
}

/// ファイル名のコード部分・商品名部分それぞれの上限（バイト）
///
/// 多くのファイルシステムの上限は255バイト。区切りと拡張子の分を残す。
const MAX_NAME_PART_BYTES: usize = 120;

/// 文字境界を保ったまま `max_bytes` 以下に切り詰める
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// `<code> - <name>.png`。どんな商品名・エラーメッセージでも有効なファイル名になる
pub fn screenshot_file_name(code: &str, name: &str) -> String {
    let code = sanitize_file_name(code);
    let name = sanitize_file_name(name);
    format!(
        "{} - {}.png",
        truncate_bytes(&code, MAX_NAME_PART_BYTES),
        truncate_bytes(&name, MAX_NAME_PART_BYTES).trim_end()
    )
}

/// ファイル名に使えない文字を `_` に置き換える
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// 現在のページを `screenshots/<code> - <name>.png` に保存
pub async fn capture_screenshot(
    page: &dyn PageDriver,
    folder: &OutputFolder,
    code: &str,
    name: &str,
) -> Result<PathBuf, ScraperError> {
    let png = page.screenshot().await?;
    let path = folder.screenshots().join(screenshot_file_name(code, name));

    tokio::fs::write(&path, &png).await?;
    debug!("Screenshot saved: {:?} ({} bytes)", path, png.len());
    Ok(path)
}

/// 全レコードを1シートのxlsxに書き出す。列は最初に現れた順
pub fn export_results(
    articles: &[ArticleRecord],
    folder: &OutputFolder,
) -> Result<PathBuf, ScraperError> {
    let path = folder
        .path()
        .join(format!("{}_{}.xlsx", EXPORT_PREFIX, timestamp()));
    write_workbook(articles, &path)?;
    info!("Exported {} rows to {:?}", articles.len(), path);
    Ok(path)
}

fn write_workbook(articles: &[ArticleRecord], path: &Path) -> Result<(), ScraperError> {
    let columns: IndexSet<&str> = articles.iter().flat_map(|a| a.columns()).collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *column, &header_format)?;
    }

    for (row, article) in articles.iter().enumerate() {
        for (col, column) in columns.iter().enumerate() {
            if let Some(value) = article.get(column) {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chausson::{ScrapeResult, CODE_COLUMN, URL_COLUMN};
    use crate::testing::{read_rows, temp_dir, FakePage};

    #[test]
    fn test_output_folder_layout() {
        let dir = temp_dir("output-folder");

        let folder = OutputFolder::create(&dir).unwrap();

        let name = folder.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Scraping_Chausson_"));
        assert!(folder.screenshots().is_dir());
        assert_eq!(folder.path().parent().unwrap(), dir.as_path());
    }

    #[test]
    fn test_output_folder_is_unique_per_run() {
        let dir = temp_dir("output-unique");

        let first = OutputFolder::create_named(&dir, "Scraping_Chausson_20260101-10h00.00").unwrap();
        let second = OutputFolder::create_named(&dir, "Scraping_Chausson_20260101-10h00.00").unwrap();

        assert_ne!(first, second);
        assert!(second.path().ends_with("Scraping_Chausson_20260101-10h00.00-2"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("0000042 - error: timed out: a/b"),
            "0000042 - error_ timed out_ a_b"
        );
        assert_eq!(sanitize_file_name("Plaque BA13 1/2"), "Plaque BA13 1_2");
        assert_eq!(sanitize_file_name("Vis à bois"), "Vis à bois");
    }

    #[test]
    fn test_truncate_bytes_keeps_char_boundary() {
        // 'é' は2バイト
        assert_eq!(truncate_bytes("ééé", 3), "é");
        assert_eq!(truncate_bytes("ééé", 4), "éé");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }

    #[test]
    fn test_screenshot_file_name_is_bounded() {
        let url = format!("https://www.chausson.fr/p/{}", "plaque-de-platre-".repeat(20));
        let name = format!("error: ナビゲーションエラー: net::ERR_NAME_NOT_RESOLVED at {}", url);
        assert!(name.len() > 255);

        let file_name = screenshot_file_name("0000042", &name);

        assert!(file_name.len() <= 255);
        assert!(file_name.starts_with("0000042 - error_ "));
        assert!(file_name.ends_with(".png"));
        assert!(!file_name.contains('/'));
    }

    #[tokio::test]
    async fn test_capture_screenshot_with_long_name() {
        let folder = OutputFolder::create(temp_dir("screenshot-long")).unwrap();
        let page = FakePage::new();
        let name = "Plaque de plâtre hydrofuge ".repeat(20);

        let path = capture_screenshot(&page, &folder, "0000042", &name)
            .await
            .unwrap();

        assert!(path.is_file());
        assert!(path.file_name().unwrap().len() <= 255);
    }

    #[tokio::test]
    async fn test_capture_screenshot() {
        let folder = OutputFolder::create(temp_dir("screenshot")).unwrap();
        let page = FakePage::new();

        let path = capture_screenshot(&page, &folder, "0000042", "Vis inox A2")
            .await
            .unwrap();

        assert_eq!(path, folder.screenshots().join("0000042 - Vis inox A2.png"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_capture_screenshot_failure_propagates() {
        let folder = OutputFolder::create(temp_dir("screenshot-fail")).unwrap();
        let page = FakePage::new().with_failing_screenshot();

        let err = capture_screenshot(&page, &folder, "0000042", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ScraperError::Screenshot(_)));
    }

    #[test]
    fn test_export_rows_and_columns() {
        let folder = OutputFolder::create(temp_dir("export")).unwrap();
        let mut first = ArticleRecord::from_pairs([
            (CODE_COLUMN, "0000042"),
            (URL_COLUMN, "https://www.chausson.fr/p/42"),
        ]);
        first.apply(&ScrapeResult::InvalidUrl);
        let mut second = ArticleRecord::from_pairs([
            (CODE_COLUMN, "0000043"),
            (URL_COLUMN, "https://www.chausson.fr/p/43"),
        ]);
        second.apply(&ScrapeResult::Failed("boom".into()));

        let path = export_results(&[first, second], &folder).unwrap();

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("Résultat_Scraping_Chausson_"));
        assert!(file_name.ends_with(".xlsx"));

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec![
                "code_article",
                "url_chausson",
                "product_reference_code",
                "depot_selected",
                "product_name",
                "product_price",
                "product_unit",
            ]
        );
        assert_eq!(rows[1][0], "0000042");
        assert_eq!(rows[1][2], "Invalide URL");
        assert_eq!(rows[2][0], "0000043");
        assert_eq!(rows[2][4], "error: boom");
    }
}
