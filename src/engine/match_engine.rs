// ==========================================
// 钢材库存匹配系统 - 匹配引擎
// ==========================================
// 职责: 需求表 × 供应表 按 (钢种, 表面, 厚度, 宽度) 精确等值内连接
// 规则:
// - 文本按值精确相等；数值按数值精确相等，无容差
// - Null 与任何值（包括 Null）都不相等
// - 多对多，不做排序/打分
// - 输出列 = 需求列 + 供应列，同名列加角色前缀消歧
// 红线: 无状态、无 I/O
// ==========================================

use crate::domain::{fields, Diagnostics, EventKind, Stage, Table, TableRole, Value};
use std::collections::HashMap;

/// 匹配键字段对（需求侧, 供应侧）
pub const MATCH_KEYS: [(&str, &str); 4] = [
    (fields::PREFERRED_GRADE, fields::GRADE),
    (fields::PREFERRED_FINISH, fields::FINISH),
    (fields::PREFERRED_THICKNESS, fields::THICKNESS),
    (fields::PREFERRED_WIDTH, fields::WIDTH),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Text(String),
    Number(u64),
}

impl KeyPart {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(KeyPart::Text(s.clone())),
            Value::Number(n) if n.is_nan() => None,
            // -0.0 与 0.0 数值相等
            Value::Number(n) if *n == 0.0 => Some(KeyPart::Number(0f64.to_bits())),
            Value::Number(n) => Some(KeyPart::Number(n.to_bits())),
        }
    }
}

type MatchKey = Vec<KeyPart>;

fn extract_key(row: &[Value], indexes: &[Option<usize>]) -> Option<MatchKey> {
    indexes
        .iter()
        .map(|idx| idx.and_then(|i| KeyPart::from_value(&row[i])))
        .collect()
}

/// 连接结果中的列名（同名列带角色前缀）
///
/// 先找原名，找不到再找带前缀的名字
pub fn joined_column(table: &Table, role: TableRole, field: &str) -> Option<usize> {
    table
        .column_index(field)
        .or_else(|| table.column_index(&format!("{}{}", role.prefix(), field)))
}

#[derive(Debug, Default)]
pub struct MatchEngine;

impl MatchEngine {
    pub fn new() -> Self {
        Self
    }

    /// 执行等值内连接
    ///
    /// # 返回
    /// - 连接结果表（行序: 需求行序，同一需求内按供应行序）
    pub fn join(&self, demand: &Table, supply: &Table, diagnostics: &mut Diagnostics) -> Table {
        let demand_idx: Vec<Option<usize>> = MATCH_KEYS
            .iter()
            .map(|(d, _)| demand.column_index(d))
            .collect();
        let supply_idx: Vec<Option<usize>> = MATCH_KEYS
            .iter()
            .map(|(_, s)| supply.column_index(s))
            .collect();

        // 供应侧建索引
        let mut index: HashMap<MatchKey, Vec<usize>> = HashMap::new();
        for (row_idx, row) in supply.rows().iter().enumerate() {
            if let Some(key) = extract_key(row, &supply_idx) {
                index.entry(key).or_default().push(row_idx);
            }
        }

        let mut output = Table::new(TableRole::Matched, Self::output_columns(demand, supply));
        for name in demand.synthesized_columns().chain(supply.synthesized_columns()) {
            output.mark_synthesized(name);
        }
        Self::mark_prefixed_synthesized(&mut output, demand);
        Self::mark_prefixed_synthesized(&mut output, supply);

        for (row_idx, demand_row) in demand.rows().iter().enumerate() {
            let Some(key) = extract_key(demand_row, &demand_idx) else {
                diagnostics.row_warning(
                    Stage::Match,
                    EventKind::DemandKeyMissing,
                    row_idx,
                    None,
                    "需求记录匹配键缺失，不参与匹配",
                );
                continue;
            };

            if let Some(matches) = index.get(&key) {
                for &supply_row_idx in matches {
                    let mut joined = demand_row.clone();
                    joined.extend(supply.rows()[supply_row_idx].iter().cloned());
                    output.push_row(joined);
                }
            }
        }

        output
    }

    fn output_columns(demand: &Table, supply: &Table) -> Vec<String> {
        let demand_cols = demand.columns();
        let supply_cols = supply.columns();

        let label = |name: &String, role: TableRole, other: &[String]| {
            if other.contains(name) {
                format!("{}{}", role.prefix(), name)
            } else {
                name.clone()
            }
        };

        demand_cols
            .iter()
            .map(|c| label(c, TableRole::Demand, supply_cols))
            .chain(
                supply_cols
                    .iter()
                    .map(|c| label(c, TableRole::Supply, demand_cols)),
            )
            .collect()
    }

    fn mark_prefixed_synthesized(output: &mut Table, source: &Table) {
        let prefixed: Vec<String> = source
            .synthesized_columns()
            .map(|c| format!("{}{}", source.role.prefix(), c))
            .collect();
        for name in prefixed {
            output.mark_synthesized(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn supply_table(rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            TableRole::Supply,
            cols(&["grade", "finish", "thickness", "width", "weight", "quantity"]),
            rows,
        )
    }

    fn demand_table(rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            TableRole::Demand,
            cols(&[
                "buyer_id",
                "preferred_grade",
                "preferred_finish",
                "preferred_thickness",
                "preferred_width",
            ]),
            rows,
        )
    }

    fn supply(grade: &str, thickness: f64, weight: f64) -> Vec<Value> {
        vec![
            Value::from(grade),
            Value::from("matte"),
            Value::Number(thickness),
            Value::Number(100.0),
            Value::Number(weight),
            Value::Number(10.0),
        ]
    }

    fn demand(buyer: &str, grade: Option<&str>, thickness: f64) -> Vec<Value> {
        vec![
            Value::from(buyer),
            Value::from(grade),
            Value::from("matte"),
            Value::Number(thickness),
            Value::Number(100.0),
        ]
    }

    #[test]
    fn test_exact_join_single_match() {
        let s = supply_table(vec![supply("A36", 2.0, 50.0), supply("S235", 2.0, 40.0)]);
        let d = demand_table(vec![demand("B1", Some("A36"), 2.0)]);
        let mut diag = Diagnostics::new();

        let joined = MatchEngine::new().join(&d, &s, &mut diag);

        assert_eq!(joined.row_count(), 1);
        assert_eq!(joined.get(0, "buyer_id"), Some(&Value::from("B1")));
        assert_eq!(joined.get(0, "grade"), Some(&Value::from("A36")));
        assert_eq!(joined.get(0, "weight"), Some(&Value::Number(50.0)));
    }

    #[test]
    fn test_no_numeric_tolerance() {
        let s = supply_table(vec![supply("A36", 1.5000001, 50.0)]);
        let d = demand_table(vec![demand("B1", Some("A36"), 1.5)]);
        let mut diag = Diagnostics::new();

        let joined = MatchEngine::new().join(&d, &s, &mut diag);

        assert!(joined.is_empty());
    }

    #[test]
    fn test_text_match_is_case_sensitive() {
        let s = supply_table(vec![supply("a36", 2.0, 50.0)]);
        let d = demand_table(vec![demand("B1", Some("A36"), 2.0)]);
        let mut diag = Diagnostics::new();

        assert!(MatchEngine::new().join(&d, &s, &mut diag).is_empty());
    }

    #[test]
    fn test_null_key_never_matches() {
        let mut null_supply = supply("A36", 2.0, 50.0);
        null_supply[0] = Value::Null;
        let s = supply_table(vec![null_supply, supply("A36", 2.0, 50.0)]);
        let d = demand_table(vec![demand("B1", None, 2.0)]);
        let mut diag = Diagnostics::new();

        let joined = MatchEngine::new().join(&d, &s, &mut diag);

        assert!(joined.is_empty());
        assert_eq!(diag.count(EventKind::DemandKeyMissing), 1);
    }

    #[test]
    fn test_many_to_many_preserves_order() {
        let s = supply_table(vec![
            supply("A36", 2.0, 50.0),
            supply("S235", 2.0, 10.0),
            supply("A36", 2.0, 70.0),
        ]);
        let d = demand_table(vec![
            demand("B1", Some("A36"), 2.0),
            demand("B2", Some("A36"), 2.0),
        ]);
        let mut diag = Diagnostics::new();

        let joined = MatchEngine::new().join(&d, &s, &mut diag);

        let pairs: Vec<(String, String)> = (0..joined.row_count())
            .map(|i| {
                (
                    joined.get(i, "buyer_id").unwrap().to_string(),
                    joined.get(i, "weight").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("B1".to_string(), "50".to_string()),
                ("B1".to_string(), "70".to_string()),
                ("B2".to_string(), "50".to_string()),
                ("B2".to_string(), "70".to_string()),
            ]
        );
    }

    #[test]
    fn test_conflicting_columns_get_role_prefix() {
        let s = Table::from_rows(
            TableRole::Supply,
            cols(&["grade", "finish", "thickness", "width", "description"]),
            vec![vec![
                Value::from("A36"),
                Value::from("matte"),
                Value::Number(2.0),
                Value::Number(100.0),
                Value::from("coil"),
            ]],
        );
        let d = Table::from_rows(
            TableRole::Demand,
            cols(&[
                "buyer_id",
                "preferred_grade",
                "preferred_finish",
                "preferred_thickness",
                "preferred_width",
                "description",
            ]),
            vec![vec![
                Value::from("B1"),
                Value::from("A36"),
                Value::from("matte"),
                Value::Number(2.0),
                Value::Number(100.0),
                Value::from("urgent"),
            ]],
        );
        let mut diag = Diagnostics::new();

        let joined = MatchEngine::new().join(&d, &s, &mut diag);

        assert_eq!(joined.get(0, "demand_description"), Some(&Value::from("urgent")));
        assert_eq!(joined.get(0, "supply_description"), Some(&Value::from("coil")));
        assert!(!joined.has_column("description"));
        assert_eq!(
            joined_column(&joined, TableRole::Supply, "description"),
            joined.column_index("supply_description")
        );
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(
            KeyPart::from_value(&Value::Number(-0.0)),
            KeyPart::from_value(&Value::Number(0.0))
        );
        assert_eq!(KeyPart::from_value(&Value::Number(f64::NAN)), None);
    }
}
