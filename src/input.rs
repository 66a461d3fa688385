//! 入力CSVの読み込み

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::chausson::{pad_code, ArticleRecord, CODE_COLUMN, URL_COLUMN};
use crate::error::ScraperError;

const DELIMITER: u8 = b';';

/// セミコロン区切りCSVを読み込む。値はすべて文字列のまま、商品コードは7桁ゼロ埋め
pub fn load_articles(path: impl AsRef<Path>) -> Result<Vec<ArticleRecord>, ScraperError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScraperError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let articles = read_articles(file)?;
    info!("Loaded {} articles from {:?}", articles.len(), path);
    Ok(articles)
}

/// ヘッダー名を一意にする
///
/// 空のヘッダーは `Unnamed: <列番号>`、重複は `<名前>.1`, `<名前>.2` ... になる。
/// どの列も出力まで残る。
pub fn column_names<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (i, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

/// 任意のリーダーから読み込む
pub fn read_articles<R: std::io::Read>(reader: R) -> Result<Vec<ArticleRecord>, ScraperError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = column_names(rdr.headers()?.iter());
    for required in [CODE_COLUMN, URL_COLUMN] {
        if !headers.iter().any(|h| h == required) {
            return Err(ScraperError::MalformedInput(format!(
                "missing column {:?} (found: {})",
                required,
                headers.join(", ")
            )));
        }
    }

    let mut articles = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let row = result?;
        let mut article = ArticleRecord::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.as_str(), row.get(i).unwrap_or_default())),
        );
        let code = pad_code(article.code());
        article.insert(CODE_COLUMN, code);
        debug!("Row {}: {} -> {}", line + 1, article.code(), article.url());
        articles.push(article);
    }

    Ok(articles)
}
