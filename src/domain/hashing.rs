//! Content Hash Engine
//!
//! 将任意结构化值规范化后计算固定长度的 MD5 摘要 (guid)，用作缓存 key
//!
//! 规范化规则：
//! - null → "null"，布尔 → "true"/"false"
//! - 数字 → JSON 十进制文本
//! - 字符串 → 原始 UTF-8 字节（不做 Unicode 归一化）
//! - 数组 → 各元素摘要依序拼接后再哈希
//! - 对象 → key 升序，逐项渲染为 "key:" + hash(value) + ","，拼接后再哈希

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// 嵌套容器的最大深度
pub const MAX_DEPTH: usize = 128;

/// 预计算摘要字段名
pub const GUID_FIELD: &str = "guid";

/// 摘要计算错误
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Value nesting exceeds {0} levels")]
    DepthExceeded(usize),

    #[error("Value is not serializable: {0}")]
    NotSerializable(String),
}

/// 计算字符串的摘要
pub fn hash_str(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

/// 计算结构化值的摘要
pub fn hash_value(value: &Value) -> Result<String, HashError> {
    digest(value, 0, false)
}

/// 计算结构化值的摘要，信任对象自带的 `guid` 字段
///
/// 仅用于内部生成的值：伪造或过期的 guid 会绕过重新计算
pub fn hash_cached(value: &Value) -> Result<String, HashError> {
    digest(value, 0, true)
}

/// 序列化任意类型后计算摘要
pub fn hash_serialize<T: Serialize + ?Sized>(value: &T) -> Result<String, HashError> {
    let value =
        serde_json::to_value(value).map_err(|e| HashError::NotSerializable(e.to_string()))?;
    hash_value(&value)
}

fn digest(value: &Value, depth: usize, trust_guid: bool) -> Result<String, HashError> {
    if depth > MAX_DEPTH {
        return Err(HashError::DepthExceeded(MAX_DEPTH));
    }

    match value {
        Value::Null => Ok(hash_str("null")),
        Value::Bool(b) => Ok(hash_str(if *b { "true" } else { "false" })),
        Value::Number(n) => Ok(hash_str(&n.to_string())),
        Value::String(s) => Ok(hash_str(s)),
        Value::Array(items) => {
            let mut joined = String::with_capacity(items.len() * 32);
            for item in items {
                joined.push_str(&digest(item, depth + 1, trust_guid)?);
            }
            Ok(hash_str(&joined))
        }
        Value::Object(map) => {
            if trust_guid {
                if let Some(Value::String(guid)) = map.get(GUID_FIELD) {
                    return Ok(guid.clone());
                }
            }

            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut joined = String::new();
            for key in keys {
                joined.push_str(key);
                joined.push(':');
                joined.push_str(&digest(&map[key.as_str()], depth + 1, trust_guid)?);
                joined.push(',');
            }
            Ok(hash_str(&joined))
        }
    }
}
