// ==========================================
// 钢材库存匹配系统 - 完整性过滤
// ==========================================
// 职责: 剔除任一必填字段仍为 Null 的供应记录
// 红线: 行数只减不增；保留记录的相对顺序不变
// 说明: 需求记录不在此过滤，键缺失的需求在匹配阶段自然不产出结果
// ==========================================

use crate::domain::{Diagnostics, EventKind, Stage, Table};

pub struct CompletenessFilter<'a> {
    required: &'a [String],
}

impl<'a> CompletenessFilter<'a> {
    pub fn new(required: &'a [String]) -> Self {
        Self { required }
    }

    /// 原地过滤；返回剔除行数
    ///
    /// 必填列在表中不存在时，所有行按缺失处理
    pub fn apply(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        let indexes: Vec<(&str, Option<usize>)> = self
            .required
            .iter()
            .map(|f| (f.as_str(), table.column_index(f)))
            .collect();

        let mut row_idx = 0;
        table.retain_rows(|row| {
            let missing: Vec<&str> = indexes
                .iter()
                .filter(|(_, idx)| idx.map_or(true, |i| row[i].is_null()))
                .map(|(name, _)| *name)
                .collect();

            let current = row_idx;
            row_idx += 1;

            if missing.is_empty() {
                return true;
            }

            diagnostics.row_warning(
                Stage::Completeness,
                EventKind::IncompleteRecord,
                current,
                missing.first().copied(),
                format!("必填字段缺失: {}", missing.join(", ")),
            );
            false
        })
    }
}
