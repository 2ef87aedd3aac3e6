//! Synthesis Signature
//!
//! 一次合成请求的规范描述，其 guid 即缓存 key

use serde::Serialize;
use serde_json::{Map, Value};

use super::hashing::{hash_value, HashError, GUID_FIELD};

/// 合成签名
///
/// 不变量:
/// - 创建后不可修改
/// - guid = hash(签名去掉 guid 字段)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Signature(Value);

impl Signature {
    /// 封装字段并计算 guid
    ///
    /// 传入的 `guid` 字段会被丢弃并重新计算
    pub fn seal(mut fields: Map<String, Value>) -> Result<Self, HashError> {
        fields.remove(GUID_FIELD);
        let mut value = Value::Object(fields);
        let guid = hash_value(&value)?;
        if let Value::Object(map) = &mut value {
            map.insert(GUID_FIELD.to_string(), Value::String(guid));
        }
        Ok(Self(value))
    }

    pub fn guid(&self) -> &str {
        self.0
            .get(GUID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn api(&self) -> Option<&str> {
        self.get_str("api")
    }

    pub fn text(&self) -> Option<&str> {
        self.get_str("text")
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// 重新计算 guid 并与内嵌值比对（用于外部来源的签名）
    pub fn verify(value: &Value) -> Result<bool, HashError> {
        let Some(map) = value.as_object() else {
            return Ok(false);
        };
        let Some(claimed) = map.get(GUID_FIELD).and_then(Value::as_str) else {
            return Ok(false);
        };
        let mut fields = map.clone();
        fields.remove(GUID_FIELD);
        Ok(hash_value(&Value::Object(fields))? == claimed)
    }
}
