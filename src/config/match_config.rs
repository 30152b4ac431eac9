// ==========================================
// 钢材库存匹配系统 - 匹配配置
// ==========================================
// 职责: 别名表 / 默认值填充 / 派生回填规则 / 必填字段 / 展示标签
// 存储: 可选 JSON 文件，缺省项使用内置默认值
// ==========================================

use crate::domain::{fields, normalize_label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置值非法 (key: {key}): {message}")]
    Invalid { key: String, message: String },
}

// ==========================================
// DefaultFill - 静态默认值填充
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultFill {
    pub field: String,
    pub value: f64,
}

impl DefaultFill {
    pub fn new(field: &str, value: f64) -> Self {
        Self {
            field: field.to_string(),
            value,
        }
    }
}

// ==========================================
// FallbackRule - 字段派生回填规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackCondition {
    /// 目标值为 Null 时回填
    #[default]
    TargetIsNull,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    pub target: String,
    pub source: String,
    #[serde(default)]
    pub condition: FallbackCondition,
}

impl FallbackRule {
    pub fn new(target: &str, source: &str) -> Self {
        Self {
            target: target.to_string(),
            source: source.to_string(),
            condition: FallbackCondition::TargetIsNull,
        }
    }
}

// ==========================================
// MatchConfig - 配置全集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// 供应表列名别名（已做 TRIM/小写/空格→下划线 后的标签 → 标准字段）
    pub supply_aliases: BTreeMap<String, String>,
    /// 需求表列名别名
    pub demand_aliases: BTreeMap<String, String>,
    /// 推荐管道的默认值填充（类型转换前）
    pub match_default_fills: Vec<DefaultFill>,
    /// 库存清洗管道的默认值填充
    pub inventory_default_fills: Vec<DefaultFill>,
    /// 供应表派生回填规则（按顺序执行）
    pub fallback_rules: Vec<FallbackRule>,
    /// 参与匹配前供应记录的必填字段
    pub required_supply_fields: Vec<String>,
    /// 导出展示标签
    pub display_labels: BTreeMap<String, String>,
    /// 需求侧约束列存在但单元格为 Null 时剔除该行（默认开启）
    ///
    /// 关闭后 Null 约束值视为对该采购方不设限
    pub strict_constraint_nulls: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            supply_aliases: builtin_supply_aliases(),
            demand_aliases: builtin_demand_aliases(),
            match_default_fills: vec![DefaultFill::new(fields::QUANTITY, 0.0)],
            inventory_default_fills: vec![
                DefaultFill::new(fields::QUANTITY, 0.0),
                DefaultFill::new(fields::GROSS_WEIGHT, 0.0),
                DefaultFill::new(fields::WEIGHT, 0.0),
            ],
            fallback_rules: vec![FallbackRule::new(fields::WEIGHT, fields::GROSS_WEIGHT)],
            required_supply_fields: [
                fields::GRADE,
                fields::FINISH,
                fields::THICKNESS,
                fields::WIDTH,
                fields::WEIGHT,
                fields::QUANTITY,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            display_labels: builtin_display_labels(),
            strict_constraint_nulls: true,
        }
    }
}

impl MatchConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径（None → 全部使用内置默认值）
    ///
    /// # 说明
    /// - 别名表和展示标签与内置表合并，文件中的同名项覆盖内置项
    /// - 其余字段整体替换
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Self::default(),
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                let parsed: MatchConfig =
                    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                        path: p.to_path_buf(),
                        source,
                    })?;
                parsed.with_builtin_entries()
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn with_builtin_entries(mut self) -> Self {
        merge_missing(&mut self.supply_aliases, builtin_supply_aliases());
        merge_missing(&mut self.demand_aliases, builtin_demand_aliases());
        merge_missing(&mut self.display_labels, builtin_display_labels());
        self
    }

    /// 校验配置一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_supply_fields.is_empty() {
            return Err(ConfigError::Invalid {
                key: config_keys::REQUIRED_SUPPLY_FIELDS.to_string(),
                message: "必填字段列表不能为空".to_string(),
            });
        }

        // 别名目标必须已是规范标签，且不能再被其他别名改写（保证规范化幂等）
        for (key, aliases) in [
            (config_keys::SUPPLY_ALIASES, &self.supply_aliases),
            (config_keys::DEMAND_ALIASES, &self.demand_aliases),
        ] {
            for target in aliases.values() {
                if normalize_label(target) != *target || aliases.contains_key(target) {
                    return Err(ConfigError::Invalid {
                        key: key.to_string(),
                        message: format!("别名目标不是规范字段名: {}", target),
                    });
                }
            }
        }

        for rule in &self.fallback_rules {
            if rule.target == rule.source {
                return Err(ConfigError::Invalid {
                    key: config_keys::FALLBACK_RULES.to_string(),
                    message: format!("回填规则目标与来源相同: {}", rule.target),
                });
            }
        }

        for fill in self
            .match_default_fills
            .iter()
            .chain(self.inventory_default_fills.iter())
        {
            if !fill.value.is_finite() {
                return Err(ConfigError::Invalid {
                    key: config_keys::MATCH_DEFAULT_FILLS.to_string(),
                    message: format!("默认值必须为有限数值: {}", fill.field),
                });
            }
        }

        Ok(())
    }
}

fn merge_missing(target: &mut BTreeMap<String, String>, builtin: BTreeMap<String, String>) {
    for (k, v) in builtin {
        target.entry(k).or_insert(v);
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn builtin_supply_aliases() -> BTreeMap<String, String> {
    to_map(&[
        ("thickness_(mm)", fields::THICKNESS),
        ("width_(mm)", fields::WIDTH),
        ("weight_(kg)", fields::WEIGHT),
        ("gross_weight_(kg)", fields::GROSS_WEIGHT),
    ])
}

fn builtin_demand_aliases() -> BTreeMap<String, String> {
    to_map(&[
        ("preferred_thickness_(mm)", fields::PREFERRED_THICKNESS),
        ("preferred_width_(mm)", fields::PREFERRED_WIDTH),
        ("max_weight_(kg)", fields::MAX_WEIGHT),
    ])
}

fn builtin_display_labels() -> BTreeMap<String, String> {
    to_map(&[
        ("buyer_id", "Buyer ID"),
        ("preferred_grade", "Preferred Grade"),
        ("preferred_finish", "Preferred Finish"),
        ("preferred_thickness", "Preferred Thickness (mm)"),
        ("preferred_width", "Preferred Width (mm)"),
        ("max_weight", "Max Weight (kg)"),
        ("min_quantity", "Min Quantity"),
        ("quality/choice", "Quality/Choice"),
        ("grade", "Grade"),
        ("finish", "Finish"),
        ("thickness", "Thickness (mm)"),
        ("width", "Width (mm)"),
        ("description", "Description"),
        ("gross_weight", "Gross Weight (kg)"),
        ("rp02", "RP02"),
        ("rm", "RM"),
        ("quantity", "Quantity"),
        ("ag", "AG"),
        ("ai", "AI"),
        ("material", "Material"),
        ("article_id", "Article ID"),
        ("weight", "Weight (kg)"),
        ("reserved", "Reserved"),
    ])
}

// ==========================================
// 配置键常量（JSON 字段名）
// ==========================================
pub mod config_keys {
    pub const SUPPLY_ALIASES: &str = "supply_aliases";
    pub const DEMAND_ALIASES: &str = "demand_aliases";
    pub const MATCH_DEFAULT_FILLS: &str = "match_default_fills";
    pub const INVENTORY_DEFAULT_FILLS: &str = "inventory_default_fills";
    pub const FALLBACK_RULES: &str = "fallback_rules";
    pub const REQUIRED_SUPPLY_FIELDS: &str = "required_supply_fields";
    pub const DISPLAY_LABELS: &str = "display_labels";
    pub const STRICT_CONSTRAINT_NULLS: &str = "strict_constraint_nulls";
}
