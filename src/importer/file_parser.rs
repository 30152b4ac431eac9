// ==========================================
// 钢材库存匹配系统 - 文件解析器实现
// ==========================================
// 职责: 文件 → 内存表（原始列名 + 原始单元格）
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::domain::{Table, TableRole, Value};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - role: 表角色（供应/需求）
    ///
    /// # 返回
    /// - Ok(Table): 列名为原始表头（已 TRIM），完全空白行已跳过
    /// - Err: 文件不存在、格式错误
    fn parse_table(&self, file_path: &Path, role: TableRole) -> ImportResult<Table>;
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// 空表头补位名
fn header_label(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("unnamed_{}", idx)
    } else {
        trimmed.to_string()
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path, role: TableRole) -> ImportResult<Table> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| header_label(h, idx))
            .collect();

        if headers.is_empty() {
            return Err(ImportError::MissingHeader(file_path.display().to_string()));
        }

        let mut table = Table::new(role, headers);
        let width = table.columns().len();
        for result in reader.records() {
            let record = result?;
            let row: Vec<Value> = record.iter().take(width).map(Value::from_raw).collect();

            // 跳过完全空白的行
            if row.iter().all(Value::is_null) {
                continue;
            }

            table.push_row(row);
        }

        debug!(
            file = %file_path.display(),
            rows = table.row_count(),
            columns = width,
            "CSV 解析完成"
        );
        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn cell_value(cell: &Data) -> Value {
        match cell {
            Data::Empty | Data::Error(_) => Value::Null,
            Data::Int(i) => Value::Number(*i as f64),
            Data::Float(f) => Value::Number(*f),
            Data::String(s) => Value::from_raw(s),
            other => Value::from_raw(&other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path, role: TableRole) -> ImportResult<Table> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::MissingHeader(file_path.display().to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_label(&cell.to_string(), idx))
            .collect();

        let mut table = Table::new(role, headers);
        for data_row in rows {
            let row: Vec<Value> = data_row.iter().map(Self::cell_value).collect();

            // 跳过完全空白的行
            if row.iter().all(Value::is_null) {
                continue;
            }

            table.push_row(row);
        }

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = table.row_count(),
            "Excel 解析完成"
        );
        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path, role: TableRole) -> ImportResult<Table> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_table(file_path, role),
            "xlsx" | "xls" => ExcelParser.parse_table(file_path, role),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
