use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{ArticleFetcher, FetchError, ScrapedRecord};

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article>").expect("valid regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2>").expect("valid regex"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// 通过 HTTP 抓取页面中的 `<article>`
pub struct HttpArticleFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpArticleFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self) -> Result<Vec<ScrapedRecord>, FetchError> {
        let html = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_articles(&html))
    }
}

fn inner_text(fragment: &str) -> String {
    TAG_RE
        .replace_all(fragment, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 从 HTML 中提取文章：标题取第一个 `<h2>`，内容取第一个 `<p>`
///
/// 缺少标题或内容的文章会被跳过。
pub fn parse_articles(html: &str) -> Vec<ScrapedRecord> {
    ARTICLE_RE
        .captures_iter(html)
        .filter_map(|article| {
            let body = article.get(1)?.as_str();
            let title = HEADING_RE.captures(body)?.get(1)?.as_str();
            let content = PARAGRAPH_RE.captures(body)?.get(1)?.as_str();
            Some(ScrapedRecord {
                title: inner_text(title),
                content: inner_text(content),
            })
        })
        .collect()
}
