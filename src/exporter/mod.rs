// ==========================================
// 钢材库存匹配系统 - 导出层
// ==========================================
// 职责: 内存表 → 平面分隔文件（无行索引列）
// ==========================================

pub mod csv_writer;

pub use csv_writer::{CsvTableWriter, ExportError, TableSink};
