//src/content/src/params.rs
//! 效果参数读取
//!
//! 内容表里的效果统一写成 `{ "effectKey": ..., "params": {...} }`。
//! 参数缺省时使用各效果的默认值；数值可以写成数字或数字字符串。

use dice::DiceExpr;
use error::GameError;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Element;

/// 反序列化阶段的原始效果描述
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEffect {
    #[serde(rename = "effectKey", default)]
    pub effect_key: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl RawEffect {
    pub fn key(&self) -> &str {
        self.effect_key.trim()
    }

    pub fn params(&self) -> Params<'_> {
        Params {
            key: self.key(),
            map: &self.params,
        }
    }
}

/// 带默认值的参数访问器
pub struct Params<'a> {
    key: &'a str,
    map: &'a Map<String, Value>,
}

impl Params<'_> {
    fn number(&self, name: &str) -> Option<f64> {
        match self.map.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn f64(&self, name: &str, default: f64) -> f64 {
        self.number(name).filter(|v| v.is_finite()).unwrap_or(default)
    }

    /// 小数向下取整
    pub fn i32(&self, name: &str, default: i32) -> i32 {
        self.number(name)
            .filter(|v| v.is_finite())
            .map(|v| v.floor() as i32)
            .unwrap_or(default)
    }

    /// 负数按 0 处理
    pub fn u32(&self, name: &str, default: u32) -> u32 {
        self.number(name)
            .filter(|v| v.is_finite())
            .map(|v| v.floor().max(0.0) as u32)
            .unwrap_or(default)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(Value::as_str).map(str::trim)
    }

    /// 可选的骰子表达式，格式错误属于内容错误
    pub fn dice_opt(&self, name: &str) -> Result<Option<DiceExpr>, GameError> {
        match self.text(name) {
            Some(text) => DiceExpr::parse(text).map(Some).map_err(|e| self.invalid(name, e)),
            None => Ok(None),
        }
    }

    pub fn dice(&self, name: &str, default: DiceExpr) -> Result<DiceExpr, GameError> {
        Ok(self.dice_opt(name)?.unwrap_or(default))
    }

    /// `"2d6"` 形式的参数只取骰子个数
    pub fn dice_count(&self, name: &str, default: u32) -> Result<u32, GameError> {
        Ok(self.dice_opt(name)?.map_or(default, |d| d.count()))
    }

    pub fn element(&self, name: &str, default: Element) -> Result<Element, GameError> {
        match self.text(name) {
            Some(text) => text
                .to_ascii_lowercase()
                .parse()
                .map_err(|_| self.invalid(name, format!("unknown element {text:?}"))),
            None => Ok(default),
        }
    }

    fn invalid(&self, name: &str, reason: impl std::fmt::Display) -> GameError {
        GameError::InvalidContent(format!("{}: param `{name}`: {reason}", self.key))
    }
}
