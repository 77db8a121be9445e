use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 0.5;
/// 单次请求允许的最大结果数
pub const MAX_TOP_K: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub top_k: Option<usize>,
    pub threshold: Option<f64>,
    pub identity_id: Option<String>,
    // 旧字段名，两者同时存在时以 identity_id 为准
    pub user_id: Option<String>,
}

/// 校验通过的搜索参数，由校验中间件放入请求扩展
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
    // 只透传，不参与计算
    pub threshold: f64,
    pub identity_id: String,
    pub cache_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResponse {
    pub identity_id: String,
    pub search_results: Vec<String>,
    pub inference_time: f64,
}

impl SearchRequest {
    pub fn validate(self, cache_key: String) -> Result<SearchQuery, AppError> {
        let text = self.text.filter(|t| !t.is_empty());
        let identity_id = self
            .identity_id
            .filter(|id| !id.is_empty())
            .or(self.user_id.filter(|id| !id.is_empty()));

        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k > MAX_TOP_K {
            return Err(AppError::Validation(format!(
                "top_k 不能超过 {}",
                MAX_TOP_K
            )));
        }

        match (text, identity_id) {
            (Some(text), Some(identity_id)) => Ok(SearchQuery {
                text,
                top_k,
                threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
                identity_id,
                cache_key,
            }),
            _ => Err(AppError::Validation(
                "text 和 identity_id 为必填字段".to_string(),
            )),
        }
    }
}

/// 生成占位搜索结果
pub fn synthesize_results(text: &str, top_k: usize) -> Vec<String> {
    (1..=top_k)
        .map(|i| format!("Result {} for '{}'", i, text))
        .collect()
}
