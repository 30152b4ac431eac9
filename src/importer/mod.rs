// ==========================================
// 钢材库存匹配系统 - 导入层
// ==========================================
// 职责: 外部文件 → 原始内存表
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
