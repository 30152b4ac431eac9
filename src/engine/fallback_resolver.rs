// ==========================================
// 钢材库存匹配系统 - 缺失值填充与派生回填
// ==========================================
// 两套独立机制:
// 1. DefaultFiller   - 类型转换前，对"可安全置零"字段做静态默认值填充
// 2. FallbackResolver - 类型转换后，按声明顺序执行 字段 ← 字段 回填
// 红线: 两者均以 Null 判定为前提，重复执行无副作用
// ==========================================

use crate::config::{DefaultFill, FallbackCondition, FallbackRule};
use crate::domain::{Diagnostics, EventKind, Stage, Table, Value};

// ==========================================
// DefaultFiller - 静态默认值填充
// ==========================================
pub struct DefaultFiller<'a> {
    fills: &'a [DefaultFill],
}

impl<'a> DefaultFiller<'a> {
    pub fn new(fills: &'a [DefaultFill]) -> Self {
        Self { fills }
    }

    /// 原地填充；返回填充的单元格数
    ///
    /// # 规则
    /// - 列存在: Null 单元格填默认值
    /// - 列缺失: 补建整列默认值
    pub fn apply(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        let mut total = 0;

        for fill in self.fills {
            let default = Value::Number(fill.value);

            let Some(idx) = table.column_index(&fill.field) else {
                table.add_column(&fill.field, default);
                total += table.row_count();
                diagnostics.field_info(
                    Stage::DefaultFill,
                    EventKind::DefaultFilled,
                    &fill.field,
                    format!("源表缺少字段 '{}'，整列填充默认值 {}", fill.field, fill.value),
                );
                continue;
            };

            let mut filled = 0;
            for row in table.rows_mut() {
                if row[idx].is_null() {
                    row[idx] = default.clone();
                    filled += 1;
                }
            }

            if filled > 0 {
                total += filled;
                diagnostics.field_info(
                    Stage::DefaultFill,
                    EventKind::DefaultFilled,
                    &fill.field,
                    format!("'{}' 缺失值 {} 个已填充默认值 {}", fill.field, filled, fill.value),
                );
            }
        }

        total
    }
}

// ==========================================
// FallbackResolver - 派生回填
// ==========================================
pub struct FallbackResolver<'a> {
    rules: &'a [FallbackRule],
}

impl<'a> FallbackResolver<'a> {
    pub fn new(rules: &'a [FallbackRule]) -> Self {
        Self { rules }
    }

    /// 按规则顺序原地回填；返回回填的单元格数
    ///
    /// # 规则
    /// - 来源列缺失 → 规则不生效
    /// - 目标列缺失 → 补建后回填
    /// - 补建的目标列一旦写入来源值，即视为源数据列
    pub fn resolve(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        let mut total = 0;

        for rule in self.rules {
            let Some(source_idx) = table.column_index(&rule.source) else {
                continue;
            };
            let target_idx = match table.column_index(&rule.target) {
                Some(idx) => idx,
                None => table.add_synthesized_column(&rule.target),
            };

            let mut applied = 0;
            for (row_idx, row) in table.rows_mut().iter_mut().enumerate() {
                let should_fill = match rule.condition {
                    FallbackCondition::TargetIsNull => row[target_idx].is_null(),
                };
                if should_fill && !row[source_idx].is_null() {
                    row[target_idx] = row[source_idx].clone();
                    applied += 1;
                    diagnostics.row_info(
                        Stage::Fallback,
                        EventKind::FallbackApplied,
                        row_idx,
                        &rule.target,
                        format!("{} ← {}", rule.target, rule.source),
                    );
                }
            }
            if applied > 0 {
                table.mark_sourced(&rule.target);
            }
            total += applied;
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableRole;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            TableRole::Supply,
            columns.iter().map(|s| s.to_string()).collect(),
            rows,
        )
    }

    #[test]
    fn test_default_fill_nulls_and_missing_column() {
        let fills = vec![DefaultFill::new("quantity", 0.0), DefaultFill::new("reserved", 0.0)];
        let mut t = table(
            &["quantity"],
            vec![vec![Value::Null], vec![Value::from("4")]],
        );
        let mut diag = Diagnostics::new();

        let filled = DefaultFiller::new(&fills).apply(&mut t, &mut diag);

        assert_eq!(filled, 3);
        assert_eq!(t.get(0, "quantity"), Some(&Value::Number(0.0)));
        // 非空值保持原样（类型转换在后）
        assert_eq!(t.get(1, "quantity"), Some(&Value::from("4")));
        assert_eq!(t.get(1, "reserved"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_default_fill_does_not_touch_garbage() {
        let fills = vec![DefaultFill::new("quantity", 0.0)];
        let mut t = table(&["quantity"], vec![vec![Value::from("abc")]]);
        let mut diag = Diagnostics::new();

        DefaultFiller::new(&fills).apply(&mut t, &mut diag);

        assert_eq!(t.get(0, "quantity"), Some(&Value::from("abc")));
    }

    #[test]
    fn test_weight_from_gross_weight() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(
            &["weight", "gross_weight"],
            vec![
                vec![Value::Null, Value::Number(75.0)],
                vec![Value::Number(50.0), Value::Number(55.0)],
                vec![Value::Null, Value::Null],
            ],
        );
        let mut diag = Diagnostics::new();

        let applied = FallbackResolver::new(&rules).resolve(&mut t, &mut diag);

        assert_eq!(applied, 1);
        assert_eq!(t.get(0, "weight"), Some(&Value::Number(75.0)));
        assert_eq!(t.get(1, "weight"), Some(&Value::Number(50.0)));
        assert_eq!(t.get(2, "weight"), Some(&Value::Null));
    }

    #[test]
    fn test_fallback_creates_missing_target() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(&["gross_weight"], vec![vec![Value::Number(75.0)]]);
        let mut diag = Diagnostics::new();

        FallbackResolver::new(&rules).resolve(&mut t, &mut diag);

        assert_eq!(t.get(0, "weight"), Some(&Value::Number(75.0)));
        assert!(t.has_source_column("weight"));
    }

    #[test]
    fn test_filled_synthesized_target_becomes_sourced() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(&["gross_weight"], vec![vec![Value::Number(75.0)]]);
        t.add_synthesized_column("weight");
        let mut diag = Diagnostics::new();

        FallbackResolver::new(&rules).resolve(&mut t, &mut diag);

        assert!(!t.is_synthesized("weight"));
        assert_eq!(diag.count(EventKind::FallbackApplied), 1);
    }

    #[test]
    fn test_unfilled_synthesized_target_stays_synthesized() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(&["gross_weight"], vec![vec![Value::Null]]);
        t.add_synthesized_column("weight");
        let mut diag = Diagnostics::new();

        FallbackResolver::new(&rules).resolve(&mut t, &mut diag);

        assert!(t.is_synthesized("weight"));
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(
            &["weight", "gross_weight"],
            vec![vec![Value::Null, Value::Number(75.0)]],
        );
        let mut diag = Diagnostics::new();
        let resolver = FallbackResolver::new(&rules);

        resolver.resolve(&mut t, &mut diag);
        let snapshot = t.clone();
        let second = resolver.resolve(&mut t, &mut diag);

        assert_eq!(second, 0);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_missing_source_is_noop() {
        let rules = vec![FallbackRule::new("weight", "gross_weight")];
        let mut t = table(&["weight"], vec![vec![Value::Null]]);
        let mut diag = Diagnostics::new();

        let applied = FallbackResolver::new(&rules).resolve(&mut t, &mut diag);

        assert_eq!(applied, 0);
        assert_eq!(t.get(0, "weight"), Some(&Value::Null));
    }
}
