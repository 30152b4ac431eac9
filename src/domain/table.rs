// ==========================================
// 钢材库存匹配系统 - 内存表结构
// ==========================================
// 职责: 列名 + 行存储 + 合成列标记
// 红线: 表操作只做结构变换，不含业务规则
// ==========================================

use crate::domain::types::{TableRole, Value};
use serde::Serialize;
use std::collections::BTreeSet;

// ==========================================
// Table - 行式内存表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub role: TableRole,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    // 由 schema 层补建（源数据中不存在）的列
    synthesized: BTreeSet<String>,
}

impl Table {
    pub fn new(role: TableRole, columns: Vec<String>) -> Self {
        Self {
            role,
            columns,
            rows: Vec::new(),
            synthesized: BTreeSet::new(),
        }
    }

    /// 按列名 + 行数据构造；行长度不足时补 Null，超长截断
    pub fn from_rows(role: TableRole, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(role, columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 列存在且来自源数据（非 schema 补建）
    pub fn has_source_column(&self, name: &str) -> bool {
        self.has_column(name) && !self.synthesized.contains(name)
    }

    pub fn is_synthesized(&self, name: &str) -> bool {
        self.synthesized.contains(name)
    }

    pub fn synthesized_columns(&self) -> impl Iterator<Item = &String> {
        self.synthesized.iter()
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }

    /// 追加一列，所有行填充 fill；返回列下标
    pub fn add_column(&mut self, name: &str, fill: Value) -> usize {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        self.columns.len() - 1
    }

    /// 追加 schema 补建列（全 Null）
    pub fn add_synthesized_column(&mut self, name: &str) -> usize {
        self.synthesized.insert(name.to_string());
        self.add_column(name, Value::Null)
    }

    /// 重命名一列（只改标签）
    pub fn rename_column(&mut self, idx: usize, new_name: &str) {
        if let Some(col) = self.columns.get_mut(idx) {
            let old = std::mem::replace(col, new_name.to_string());
            if self.synthesized.remove(&old) {
                self.synthesized.insert(new_name.to_string());
            }
        }
    }

    /// 按谓词保留行，保持原有顺序；返回删除行数
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// 补建列已被真实数据写入（如派生回填）后，不再视为补建列
    pub fn mark_sourced(&mut self, name: &str) {
        self.synthesized.remove(name);
    }

    pub fn mark_synthesized(&mut self, name: &str) {
        if self.has_column(name) {
            self.synthesized.insert(name.to_string());
        }
    }

    /// 纵向拼接（按列名对齐，列取并集，缺失单元格为 Null）
    ///
    /// 合成标记: 只要任一来源真实提供该列，结果即视为源列
    pub fn concat(role: TableRole, tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for col in &table.columns {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut sourced: BTreeSet<String> = BTreeSet::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for table in &tables {
            for col in &table.columns {
                seen.insert(col.clone());
                if !table.synthesized.contains(col) {
                    sourced.insert(col.clone());
                }
            }
        }

        let mut out = Table::new(role, columns.clone());
        for table in tables {
            let mapping: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for row in table.rows {
                let new_row = mapping
                    .iter()
                    .map(|m| m.map(|i| row[i].clone()).unwrap_or(Value::Null))
                    .collect();
                out.rows.push(new_row);
            }
        }

        out.synthesized = seen.difference(&sourced).cloned().collect();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::new(TableRole::Supply, cols(&["grade", "finish"]));
        table.push_row(vec![Value::from("A36")]);
        assert_eq!(table.get(0, "finish"), Some(&Value::Null));
    }

    #[test]
    fn test_retain_rows_preserves_order() {
        let mut table = Table::from_rows(
            TableRole::Supply,
            cols(&["n"]),
            vec![
                vec![Value::Number(1.0)],
                vec![Value::Number(2.0)],
                vec![Value::Number(3.0)],
            ],
        );
        let removed = table.retain_rows(|r| r[0] != Value::Number(2.0));
        assert_eq!(removed, 1);
        assert_eq!(table.get(0, "n"), Some(&Value::Number(1.0)));
        assert_eq!(table.get(1, "n"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_concat_union_of_columns() {
        let a = Table::from_rows(
            TableRole::Supply,
            cols(&["grade", "weight"]),
            vec![vec![Value::from("A36"), Value::Number(10.0)]],
        );
        let b = Table::from_rows(
            TableRole::Supply,
            cols(&["grade", "gross_weight"]),
            vec![vec![Value::from("S235"), Value::Number(12.0)]],
        );

        let merged = Table::concat(TableRole::Supply, vec![a, b]);

        assert_eq!(merged.columns(), &cols(&["grade", "weight", "gross_weight"])[..]);
        assert_eq!(merged.row_count(), 2);
        assert_eq!(merged.get(0, "gross_weight"), Some(&Value::Null));
        assert_eq!(merged.get(1, "weight"), Some(&Value::Null));
        assert_eq!(merged.get(1, "gross_weight"), Some(&Value::Number(12.0)));
    }

    #[test]
    fn test_concat_keeps_synthesized_only_when_no_source_provides_it() {
        let mut a = Table::new(TableRole::Demand, cols(&["buyer_id"]));
        a.add_synthesized_column("max_weight");
        let mut b = Table::new(TableRole::Demand, cols(&["buyer_id", "max_weight"]));
        b.add_synthesized_column("min_quantity");

        let merged = Table::concat(TableRole::Demand, vec![a, b]);

        assert!(merged.has_source_column("max_weight"));
        assert!(merged.is_synthesized("min_quantity"));
    }

    #[test]
    fn test_rename_column_moves_synthesized_flag() {
        let mut table = Table::new(TableRole::Demand, cols(&["buyer_id"]));
        let idx = table.add_synthesized_column("max_weight");
        table.rename_column(idx, "Max Weight (kg)");
        assert!(table.is_synthesized("Max Weight (kg)"));
        assert!(!table.is_synthesized("max_weight"));
    }

    #[test]
    fn test_mark_sourced_clears_synthesized_flag() {
        let mut table = Table::new(TableRole::Supply, cols(&["gross_weight"]));
        table.add_synthesized_column("weight");
        table.mark_sourced("weight");
        assert!(table.has_source_column("weight"));
        assert_eq!(table.synthesized_columns().count(), 0);
    }
}
