use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_LANDING_URL: &str = "https://www.chausson.fr/";
pub const DEFAULT_NOT_FOUND_TITLE: &str = "Cette page n'a pas été trouvée";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// 入力CSV（セミコロン区切り）
    pub input_path: PathBuf,
    /// 出力ルート。実行ごとにタイムスタンプ付きフォルダを作る
    pub output_dir: PathBuf,
    /// ブラウザ実行ファイル
    pub browser_path: PathBuf,
    /// オペレーター設定用のトップページ
    pub landing_url: String,
    /// ページ遷移後の固定待機
    pub settle_wait: Duration,
    /// 倉庫表示要素の可視待ちタイムアウト
    pub depot_timeout: Duration,
    /// 「ページが見つかりません」のタイトル
    pub not_found_title: String,
    pub headless: bool,
    pub debug: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input/input.csv"),
            output_dir: PathBuf::from("output"),
            browser_path: PathBuf::from("chromedriver/chrome"),
            landing_url: DEFAULT_LANDING_URL.to_string(),
            settle_wait: Duration::from_secs(10),
            depot_timeout: Duration::from_secs(10),
            not_found_title: DEFAULT_NOT_FOUND_TITLE.to_string(),
            headless: false,
            debug: false,
        }
    }
}

impl ScraperConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            ..Default::default()
        }
    }

    /// 環境変数から設定を読み込む（未設定の項目はデフォルト値）
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("CHAUSSON_INPUT") {
            config.input_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("CHAUSSON_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("CHROME_PATH") {
            config.browser_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("CHAUSSON_LANDING_URL") {
            config.landing_url = url;
        }
        if let Some(secs) = lookup("CHAUSSON_SETTLE_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => config.settle_wait = Duration::from_secs(secs),
                Err(e) => warn!("Ignoring CHAUSSON_SETTLE_SECS={}: {}", secs, e),
            }
        }
        if let Some(flag) = lookup("CHAUSSON_HEADLESS") {
            config.headless = parse_flag(&flag);
        }
        if let Some(flag) = lookup("CHAUSSON_DEBUG") {
            config.debug = parse_flag(&flag);
        }

        config
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_path = path.into();
        self
    }

    pub fn with_landing_url(mut self, url: impl Into<String>) -> Self {
        self.landing_url = url.into();
        self
    }

    pub fn with_settle_wait(mut self, wait: Duration) -> Self {
        self.settle_wait = wait;
        self
    }

    pub fn with_depot_timeout(mut self, timeout: Duration) -> Self {
        self.depot_timeout = timeout;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
