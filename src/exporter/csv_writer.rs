// ==========================================
// 钢材库存匹配系统 - CSV 导出
// ==========================================
// 规则: 表头为当前列标签；Null 写为空字段；不写行索引
// 失败时删除已写出的部分文件
// ==========================================

use crate::domain::Table;
use csv::Writer;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("输出文件写入失败 ({path}): {message}")]
    WriteFailed { path: PathBuf, message: String },
}

// ==========================================
// TableSink Trait
// ==========================================
pub trait TableSink {
    /// 写出整张表，返回写出的数据行数
    fn write_table(&self, table: &Table, path: &Path) -> Result<usize, ExportError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvTableWriter;

impl CsvTableWriter {
    fn write_all(&self, table: &Table, path: &Path) -> Result<usize, csv::Error> {
        let mut writer = Writer::from_path(path)?;

        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(table.row_count())
    }
}

impl TableSink for CsvTableWriter {
    fn write_table(&self, table: &Table, path: &Path) -> Result<usize, ExportError> {
        match self.write_all(table, path) {
            Ok(rows) => {
                info!(path = %path.display(), rows, "导出完成");
                Ok(rows)
            }
            Err(e) => {
                if path.exists() {
                    if let Err(rm) = std::fs::remove_file(path) {
                        warn!(path = %path.display(), error = %rm, "部分输出文件清理失败");
                    }
                }
                Err(ExportError::WriteFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }
}
