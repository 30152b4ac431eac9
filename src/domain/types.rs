// ==========================================
// 钢材库存匹配系统 - 领域基础类型
// ==========================================
// 职责: 单元格值 / 字段类型 / 表角色
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Value - 单元格值
// ==========================================
// 红线: Null 是唯一的缺失标记，与空字符串、0 均不同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// 从原始文本构造（TRIM 后为空 → Null）
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Null
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// 导出口径: Null → 空字段；整数值不带小数部分（2.0 → "2"）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ==========================================
// FieldType - 字段语义类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Numeric,
    Text,
}

// ==========================================
// TableRole - 数据源角色
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableRole {
    /// 供应方库存
    Supply,
    /// 采购方需求
    Demand,
    /// 匹配结果
    Matched,
}

impl TableRole {
    /// 同名字段消歧前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            TableRole::Supply => "supply_",
            TableRole::Demand => "demand_",
            TableRole::Matched => "",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableRole::Supply => "SUPPLY",
            TableRole::Demand => "DEMAND",
            TableRole::Matched => "MATCHED",
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_blank_is_null() {
        assert_eq!(Value::from_raw("   "), Value::Null);
        assert_eq!(Value::from_raw(""), Value::Null);
        assert_eq!(Value::from_raw("  A36 "), Value::Text("A36".to_string()));
    }

    #[test]
    fn test_display_export_format() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("matte").to_string(), "matte");
    }
}
