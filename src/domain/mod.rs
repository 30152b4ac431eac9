// ==========================================
// 钢材库存匹配系统 - 领域模型层
// ==========================================
// 职责: 单元格值、内存表、字段 Schema、运行诊断
// 红线: 不含文件 I/O，不含匹配规则
// ==========================================

pub mod diagnostics;
pub mod schema;
pub mod table;
pub mod types;

// 重导出核心类型
pub use diagnostics::{
    DiagLevel, DiagnosticEvent, Diagnostics, EventKind, RunSummary, Stage, StageReport,
};
pub use schema::{fields, normalize_label, FieldSpec, Presence, TableSchema};
pub use table::Table;
pub use types::{FieldType, TableRole, Value};
