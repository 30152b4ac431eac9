// ==========================================
// 钢材库存匹配系统 - 核心库
// ==========================================
// 职责: 供应方库存 × 采购方需求 → 推荐表
// 技术栈: Rust + csv + calamine
// 系统定位: 批处理工具（单线程、同步、全量内存表）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值 / 表 / Schema / 诊断
pub mod domain;

// 配置层 - 别名、填充、回填规则
pub mod config;

// 导入层 - CSV / Excel 加载
pub mod importer;

// 导出层 - CSV 写出
pub mod exporter;

// 引擎层 - 管道各阶段与编排
pub mod engine;

// 日志系统
pub mod logging;

// 阶段耗时统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::MatchConfig;
pub use domain::{
    Diagnostics, EventKind, RunSummary, Stage, Table, TableRole, TableSchema, Value,
};
pub use engine::{
    InventoryCleaningPipeline, PipelineError, PipelineOutput, PipelineResult,
    RecommendationPipeline,
};
pub use exporter::{CsvTableWriter, TableSink};
pub use importer::{FileParser, UniversalFileParser};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钢材库存匹配系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
