//! 実行全体の制御
//!
//! 入力読み込み → ブラウザ起動 → オペレーター設定 → 1件ずつスクレイプ → Excel出力 → ブラウザ終了

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::browser::BrowserSession;
use crate::chausson::{ArticleRecord, ArticleScraper, ScrapeResult};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::gate::await_operator_setup;
use crate::input::load_articles;
use crate::output::{capture_screenshot, export_results, OutputFolder};
use crate::traits::{OperatorSignal, PageDriver};

/// 1回の実行結果
#[derive(Debug)]
pub struct RunReport {
    pub output_folder: PathBuf,
    pub export_path: PathBuf,
    /// 結果列を追加済みの全レコード（入力順）
    pub articles: Vec<ArticleRecord>,
    pub scraped: usize,
    pub invalid: usize,
    pub failed: usize,
}

/// バッチ処理の結果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 結果列を書き込んだレコード数（先頭から）
    pub processed: usize,
    pub scraped: usize,
    pub invalid: usize,
    pub failed: usize,
    /// ループを中断したエラー
    pub error: Option<ScraperError>,
}

impl BatchOutcome {
    fn count(&mut self, result: &ScrapeResult) {
        match result {
            ScrapeResult::Scraped(_) => self.scraped += 1,
            ScrapeResult::InvalidUrl => self.invalid += 1,
            ScrapeResult::Failed(_) => self.failed += 1,
        }
    }
}

/// コンソールの進捗行: `<code> - <name> ---- <status>`
pub fn progress_line(article: &ArticleRecord, result: &ScrapeResult) -> String {
    format!(
        "{} - {} ---- {}",
        article.code(),
        article.product_name(),
        result.status()
    )
}

/// 全レコードを順にスクレイプし、スクリーンショットを保存する
///
/// 個々のスクレイプ失敗はレコード内の番兵値になる。スクリーンショット保存の失敗でループを中断する。
pub async fn scrape_all(
    page: &dyn PageDriver,
    scraper: &ArticleScraper,
    articles: &mut [ArticleRecord],
    folder: &OutputFolder,
) -> BatchOutcome {
    let mut stdout = std::io::stdout();
    scrape_all_with_progress(page, scraper, articles, folder, &mut stdout).await
}

/// `scrape_all` と同じ。進捗行は `progress` に書く
///
/// 進捗行はスクリーンショット保存の前に出すので、中断した商品の行も残る。
pub async fn scrape_all_with_progress(
    page: &dyn PageDriver,
    scraper: &ArticleScraper,
    articles: &mut [ArticleRecord],
    folder: &OutputFolder,
    progress: &mut (dyn Write + Send),
) -> BatchOutcome {
    let total = articles.len();
    let mut outcome = BatchOutcome::default();

    for (idx, article) in articles.iter_mut().enumerate() {
        info!("[{}/{}] Scraping {}: {}", idx + 1, total, article.code(), article.url());

        let result = scraper.scrape(page, article).await;
        article.apply(&result);
        outcome.count(&result);
        outcome.processed = idx + 1;

        if let Err(e) = writeln!(progress, "{}", progress_line(article, &result)) {
            debug!("Failed to write progress line: {}", e);
        }

        if let Err(e) =
            capture_screenshot(page, folder, article.code(), article.product_name()).await
        {
            outcome.error = Some(e);
            return outcome;
        }
    }

    outcome
}

/// 実行オーケストレーター
pub struct Runner {
    config: ScraperConfig,
    scraper: ArticleScraper,
}

impl Runner {
    pub fn new(config: ScraperConfig) -> Self {
        let scraper = ArticleScraper::from_config(&config);
        Self { config, scraper }
    }

    /// 待機戦略などを差し替えたスクレイパーを使う
    pub fn with_scraper(mut self, scraper: ArticleScraper) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// ブラウザを起動して1回実行する。ブラウザはどの経路でも必ず閉じる
    pub async fn run(&self, signal: &dyn OperatorSignal) -> Result<RunReport, ScraperError> {
        let articles = load_articles(&self.config.input_path)?;

        let mut session = BrowserSession::new(&self.config);
        let result = match session.open().await {
            Ok(page) => self.process(page, signal, articles).await,
            Err(e) => Err(e),
        };

        session.close().await;
        info!("Browser closed");
        result
    }

    /// 既に開いているページで1回実行する
    pub async fn run_with_page(
        &self,
        page: &dyn PageDriver,
        signal: &dyn OperatorSignal,
    ) -> Result<RunReport, ScraperError> {
        let articles = load_articles(&self.config.input_path)?;
        self.process(page, signal, articles).await
    }

    async fn process(
        &self,
        page: &dyn PageDriver,
        signal: &dyn OperatorSignal,
        mut articles: Vec<ArticleRecord>,
    ) -> Result<RunReport, ScraperError> {
        let folder = OutputFolder::create(&self.config.output_dir)?;

        await_operator_setup(page, &self.config.landing_url, signal).await?;

        let outcome = scrape_all(page, &self.scraper, &mut articles, &folder).await;

        if let Some(e) = outcome.error {
            error!(
                "Run aborted after {} of {} articles: {}",
                outcome.processed,
                articles.len(),
                e
            );
            // 処理済みの分だけ出力する
            if outcome.processed > 0 {
                match export_results(&articles[..outcome.processed], &folder) {
                    Ok(path) => warn!("Partial results saved to {:?}", path),
                    Err(export_err) => error!("Partial export failed: {}", export_err),
                }
            }
            return Err(e);
        }

        let export_path = export_results(&articles, &folder)?;
        println!("Results saved to {}", folder.path().display());
        info!(
            "Run complete: {} scraped, {} invalid, {} failed",
            outcome.scraped, outcome.invalid, outcome.failed
        );

        Ok(RunReport {
            output_folder: folder.path().to_path_buf(),
            export_path,
            articles,
            scraped: outcome.scraped,
            invalid: outcome.invalid,
            failed: outcome.failed,
        })
    }
}
