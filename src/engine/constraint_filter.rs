// ==========================================
// 钢材库存匹配系统 - 约束过滤链
// ==========================================
// 职责: 对匹配结果依次执行有序约束阶段
// 默认链:
// 1. 重量约束 weight   <= max_weight
// 2. 数量约束 quantity >= min_quantity
// 规则:
// - 约束列在源数据中缺失（或为补建列）→ 阶段跳过，不剔除任何行
// - 供应侧操作数为 Null → 剔除
// - 约束列存在但需求侧单元格为 Null → 剔除（非 strict 模式下视为不约束）
// 红线: 行数只减不增；保留行的相对顺序不变
// ==========================================

use crate::domain::{fields, Diagnostics, EventKind, Stage, Table, TableRole, Value};
use crate::engine::match_engine::joined_column;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// supply <= demand
    AtMost,
    /// supply >= demand
    AtLeast,
}

impl Comparison {
    fn holds(&self, supply: f64, demand: f64) -> bool {
        match self {
            Comparison::AtMost => supply <= demand,
            Comparison::AtLeast => supply >= demand,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtMost => "<=",
            Comparison::AtLeast => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSpec {
    pub stage: Stage,
    pub supply_field: String,
    pub demand_field: String,
    pub comparison: Comparison,
}

impl ConstraintSpec {
    pub fn new(stage: Stage, supply_field: &str, demand_field: &str, comparison: Comparison) -> Self {
        Self {
            stage,
            supply_field: supply_field.to_string(),
            demand_field: demand_field.to_string(),
            comparison,
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.supply_field,
            self.comparison.symbol(),
            self.demand_field
        )
    }
}

/// 单阶段结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOutcome {
    Skipped,
    Applied { removed: usize },
}

pub struct ConstraintChain {
    stages: Vec<ConstraintSpec>,
    strict_nulls: bool,
}

impl ConstraintChain {
    pub fn new(stages: Vec<ConstraintSpec>, strict_nulls: bool) -> Self {
        Self {
            stages,
            strict_nulls,
        }
    }

    /// 默认链: 重量上限 → 数量下限
    pub fn standard(strict_nulls: bool) -> Self {
        Self::new(
            vec![
                ConstraintSpec::new(
                    Stage::WeightConstraint,
                    fields::WEIGHT,
                    fields::MAX_WEIGHT,
                    Comparison::AtMost,
                ),
                ConstraintSpec::new(
                    Stage::QuantityConstraint,
                    fields::QUANTITY,
                    fields::MIN_QUANTITY,
                    Comparison::AtLeast,
                ),
            ],
            strict_nulls,
        )
    }

    pub fn stages(&self) -> &[ConstraintSpec] {
        &self.stages
    }

    /// 按顺序执行所有阶段；返回总剔除行数
    pub fn apply(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        self.stages
            .iter()
            .map(|spec| match self.apply_stage(spec, table, diagnostics) {
                ConstraintOutcome::Skipped => 0,
                ConstraintOutcome::Applied { removed } => removed,
            })
            .sum()
    }

    /// 执行单个约束阶段
    pub fn apply_stage(
        &self,
        spec: &ConstraintSpec,
        table: &mut Table,
        diagnostics: &mut Diagnostics,
    ) -> ConstraintOutcome {
        let rows_in = table.row_count();
        let label = spec.describe();

        let supply_idx = source_column(table, TableRole::Supply, &spec.supply_field);
        let demand_idx = source_column(table, TableRole::Demand, &spec.demand_field);

        let (Some(supply_idx), Some(demand_idx)) = (supply_idx, demand_idx) else {
            debug!(stage = %spec.stage, constraint = %label, "约束列缺失，阶段跳过");
            diagnostics.info(
                spec.stage,
                EventKind::ConstraintSkipped,
                format!("约束列缺失，阶段跳过: {}", label),
            );
            diagnostics.stage(spec.stage, label, rows_in, rows_in);
            return ConstraintOutcome::Skipped;
        };

        let strict = self.strict_nulls;
        let mut row_idx = 0;
        let removed = table.retain_rows(|row| {
            let current = row_idx;
            row_idx += 1;

            let verdict = match (&row[supply_idx], &row[demand_idx]) {
                (Value::Null, _) => Err(format!("{} 为空", spec.supply_field)),
                (_, Value::Null) if strict => Err(format!("{} 为空", spec.demand_field)),
                (_, Value::Null) => Ok(()),
                (s, d) => match (s.as_f64(), d.as_f64()) {
                    (Some(sv), Some(dv)) if spec.comparison.holds(sv, dv) => Ok(()),
                    (Some(sv), Some(dv)) => Err(format!(
                        "{}={} 不满足 {} {}",
                        spec.supply_field,
                        sv,
                        spec.comparison.symbol(),
                        dv
                    )),
                    _ => Err(format!("{} 非数值", label)),
                },
            };

            match verdict {
                Ok(()) => true,
                Err(message) => {
                    diagnostics.row_warning(
                        spec.stage,
                        EventKind::ConstraintRejected,
                        current,
                        Some(&spec.supply_field),
                        message,
                    );
                    false
                }
            }
        });

        diagnostics.stage(spec.stage, label, rows_in, table.row_count());
        ConstraintOutcome::Applied { removed }
    }
}

/// 约束列必须来自源数据，补建列不参与约束
fn source_column(table: &Table, role: TableRole, field: &str) -> Option<usize> {
    let idx = joined_column(table, role, field)?;
    let name = &table.columns()[idx];
    if table.is_synthesized(name) {
        None
    } else {
        Some(idx)
    }
}
