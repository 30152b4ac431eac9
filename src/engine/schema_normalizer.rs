// ==========================================
// 钢材库存匹配系统 - 列名规范化
// ==========================================
// 职责: 原始列标签 → 标准字段名（按表角色查别名表）
// 红线: 只改列标签，不改行内容与顺序；未知列原样保留
// ==========================================

use crate::config::MatchConfig;
use crate::domain::{normalize_label, Diagnostics, EventKind, Stage, Table, TableRole, Value};
use std::collections::BTreeMap;

pub struct SchemaNormalizer {
    aliases: BTreeMap<String, String>,
}

impl SchemaNormalizer {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// 按表角色取配置中的别名表
    pub fn for_role(role: TableRole, config: &MatchConfig) -> Self {
        let aliases = match role {
            TableRole::Supply => config.supply_aliases.clone(),
            TableRole::Demand => config.demand_aliases.clone(),
            TableRole::Matched => BTreeMap::new(),
        };
        Self::new(aliases)
    }

    /// 单个标签规范化
    pub fn canonical_label(&self, raw: &str) -> String {
        let base = normalize_label(raw);
        match self.aliases.get(&base) {
            Some(target) => target.clone(),
            None => base,
        }
    }

    /// 规范化整张表的列标签
    ///
    /// # 规则
    /// - 多个源列折叠到同一标准字段时合并为一列：
    ///   先出现的列优先，其 Null 单元格由后出现的列补齐
    pub fn normalize(&self, table: Table, diagnostics: &mut Diagnostics) -> Table {
        let role = table.role;
        let mut columns: Vec<String> = Vec::new();
        let mut slot_of: Vec<usize> = Vec::with_capacity(table.columns().len());

        for raw in table.columns() {
            let label = self.canonical_label(raw);
            match columns.iter().position(|c| *c == label) {
                Some(slot) => {
                    diagnostics.field_info(
                        Stage::Normalize,
                        EventKind::DuplicateColumnMerged,
                        &label,
                        format!("列 '{}' 与已有列同名，合并到 '{}'", raw, label),
                    );
                    slot_of.push(slot);
                }
                None => {
                    if *raw != label {
                        diagnostics.field_info(
                            Stage::Normalize,
                            EventKind::ColumnRenamed,
                            &label,
                            format!("'{}' → '{}'", raw, label),
                        );
                    }
                    columns.push(label);
                    slot_of.push(columns.len() - 1);
                }
            }
        }

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let mut merged = vec![Value::Null; columns.len()];
                for (value, &slot) in row.iter().zip(&slot_of) {
                    if merged[slot].is_null() {
                        merged[slot] = value.clone();
                    }
                }
                merged
            })
            .collect();

        Table::from_rows(role, columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply_normalizer() -> SchemaNormalizer {
        SchemaNormalizer::for_role(TableRole::Supply, &MatchConfig::default())
    }

    fn raw_table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            TableRole::Supply,
            columns.iter().map(|s| s.to_string()).collect(),
            rows,
        )
    }

    #[test]
    fn test_canonical_label_with_unit_suffix() {
        let normalizer = supply_normalizer();
        assert_eq!(normalizer.canonical_label(" Thickness (mm)"), "thickness");
        assert_eq!(normalizer.canonical_label("Gross Weight (kg)"), "gross_weight");
        assert_eq!(normalizer.canonical_label("Article ID"), "article_id");
    }

    #[test]
    fn test_demand_aliases_are_role_scoped() {
        let demand = SchemaNormalizer::for_role(TableRole::Demand, &MatchConfig::default());
        assert_eq!(demand.canonical_label("Max Weight (kg)"), "max_weight");
        // 供应方别名不作用于需求表
        assert_eq!(demand.canonical_label("Weight (kg)"), "weight_(kg)");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = supply_normalizer();
        let mut diag = Diagnostics::new();
        let table = raw_table(
            &["Grade", "Finish", "Thickness (mm)", "Width (mm)", "Weight (kg)", "Quantity"],
            vec![],
        );

        let once = normalizer.normalize(table, &mut diag);
        let twice = normalizer.normalize(once.clone(), &mut diag);

        assert_eq!(once.columns(), twice.columns());
        assert_eq!(
            once.columns(),
            &["grade", "finish", "thickness", "width", "weight", "quantity"]
        );
    }

    #[test]
    fn test_normalize_keeps_rows_and_order() {
        let normalizer = supply_normalizer();
        let mut diag = Diagnostics::new();
        let table = raw_table(
            &["GRADE", "Description"],
            vec![
                vec![Value::from("A36"), Value::from("coil")],
                vec![Value::from("S235"), Value::Null],
            ],
        );

        let out = normalizer.normalize(table, &mut diag);

        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(0, "grade"), Some(&Value::from("A36")));
        assert_eq!(out.get(1, "grade"), Some(&Value::from("S235")));
        assert_eq!(out.get(0, "description"), Some(&Value::from("coil")));
        assert_eq!(diag.count(EventKind::ColumnRenamed), 2);
    }

    #[test]
    fn test_duplicate_columns_coalesce_first_wins() {
        let normalizer = supply_normalizer();
        let mut diag = Diagnostics::new();
        let table = raw_table(
            &["Weight", "Weight (kg)"],
            vec![
                vec![Value::Number(10.0), Value::Number(99.0)],
                vec![Value::Null, Value::Number(12.0)],
            ],
        );

        let out = normalizer.normalize(table, &mut diag);

        assert_eq!(out.columns(), &["weight"]);
        assert_eq!(out.get(0, "weight"), Some(&Value::Number(10.0)));
        assert_eq!(out.get(1, "weight"), Some(&Value::Number(12.0)));
        assert_eq!(diag.count(EventKind::DuplicateColumnMerged), 1);
    }
}
