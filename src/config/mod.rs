// ==========================================
// 钢材库存匹配系统 - 配置层
// ==========================================
// 职责: 匹配管道配置加载与校验
// 存储: 可选 JSON 配置文件
// ==========================================

pub mod match_config;

// 重导出
pub use match_config::{
    config_keys, ConfigError, DefaultFill, FallbackCondition, FallbackRule, MatchConfig,
};
