//! 缓存键生成

use serde_json::Value;

use crate::utils::sha256_hex;

/// 后台抓取结果使用的固定缓存键
pub const SCRAPED_ARTICLES_KEY: &str = "scraped_articles";

/// 搜索响应缓存键前缀
const SEARCH_PREFIX: &str = "search:";

/// 根据请求参数生成搜索缓存键，与字段顺序无关
pub fn search_key(params: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(params, &mut canonical);
    format!("{}{}", SEARCH_PREFIX, sha256_hex(canonical.as_bytes()))
}

// 对象键按字典序递归排序后输出紧凑 JSON
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<_> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
