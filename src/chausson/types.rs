//! Chausson 関連の型定義

use indexmap::IndexMap;

/// 商品コード列
pub const CODE_COLUMN: &str = "code_article";
/// 商品ページURL列
pub const URL_COLUMN: &str = "url_chausson";
/// 商品コードのゼロ埋め桁数
pub const CODE_WIDTH: usize = 7;

/// スクレイプ結果として追加される列（この順で追加）
pub const RESULT_COLUMNS: [&str; 5] = [
    "product_reference_code",
    "depot_selected",
    "product_name",
    "product_price",
    "product_unit",
];

const INVALID_URL_REFERENCE: &str = "Invalide URL";
const NOT_AVAILABLE: &str = "N/A";
const ERROR_VALUE: &str = "error";

/// 商品コードを左ゼロ埋め（長いコードは切り詰めない）
pub fn pad_code(code: &str) -> String {
    format!("{:0>width$}", code, width = CODE_WIDTH)
}

/// 入力1行分。列は挿入順を保持し、スクレイプ結果の列が後ろに追加される
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRecord {
    fields: IndexMap<String, String>,
}

impl ArticleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn code(&self) -> &str {
        self.get(CODE_COLUMN).unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.get(URL_COLUMN).unwrap_or_default()
    }

    /// スクレイプ後の商品名（未処理なら空）
    pub fn product_name(&self) -> &str {
        self.get(RESULT_COLUMNS[2]).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// スクレイプ結果の5列を書き込む（既存の同名列は上書き）
    pub fn apply(&mut self, result: &ScrapeResult) {
        for (column, value) in RESULT_COLUMNS.iter().zip(result.values()) {
            self.insert(*column, value);
        }
    }
}

/// 商品ページから抽出した値（表示されたまま、数値変換しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub reference_code: String,
    pub depot: String,
    pub name: String,
    pub price: String,
    pub unit: String,
}

/// 1商品のスクレイプ結果。5項目すべて抽出できたか、すべて番兵値か
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeResult {
    Scraped(ProductInfo),
    /// 「ページが見つかりません」ページ
    InvalidUrl,
    /// 抽出失敗（エラーメッセージ）
    Failed(String),
}

impl ScrapeResult {
    /// `RESULT_COLUMNS` の順の値
    pub fn values(&self) -> [String; 5] {
        match self {
            ScrapeResult::Scraped(info) => [
                info.reference_code.clone(),
                info.depot.clone(),
                info.name.clone(),
                info.price.clone(),
                info.unit.clone(),
            ],
            ScrapeResult::InvalidUrl => [
                INVALID_URL_REFERENCE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
            ],
            ScrapeResult::Failed(message) => [
                ERROR_VALUE.to_string(),
                ERROR_VALUE.to_string(),
                format!("{}: {}", ERROR_VALUE, message),
                ERROR_VALUE.to_string(),
                ERROR_VALUE.to_string(),
            ],
        }
    }

    pub fn name(&self) -> String {
        let [_, _, name, _, _] = self.values();
        name
    }

    /// 進捗表示用のステータス
    pub fn status(&self) -> &'static str {
        match self {
            ScrapeResult::Scraped(_) => "Scraped successfully!",
            ScrapeResult::InvalidUrl => "Invalid URL",
            ScrapeResult::Failed(_) => "error",
        }
    }

    pub fn is_scraped(&self) -> bool {
        matches!(self, ScrapeResult::Scraped(_))
    }
}
