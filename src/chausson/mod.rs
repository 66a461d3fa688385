//! Chausson スクレイパーモジュール
//!
//! 商品ページから参照コード・倉庫・商品名・価格・単位を取得する

mod scraper;
mod types;

pub use scraper::{
    ArticleScraper, DEPOT_SELECTOR, NAME_SELECTOR, PRICE_SELECTOR, REFERENCE_SELECTOR,
    UNIT_SELECTOR,
};
pub use types::{
    pad_code, ArticleRecord, ProductInfo, ScrapeResult, CODE_COLUMN, CODE_WIDTH, RESULT_COLUMNS,
    URL_COLUMN,
};
