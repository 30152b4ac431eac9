// ==========================================
// 钢材库存匹配系统 - 展示标签格式化
// ==========================================
// 职责: 标准字段名 → 人类可读标签（如 weight → "Weight (kg)"）
// 红线: 只改列标签，不改任何单元格内容、行数与行序
// ==========================================

use crate::domain::{Diagnostics, Stage, Table, TableRole};
use std::collections::BTreeMap;

pub struct PresentationFormatter<'a> {
    labels: &'a BTreeMap<String, String>,
}

impl<'a> PresentationFormatter<'a> {
    pub fn new(labels: &'a BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    /// 原地替换列标签；返回被替换的列数
    ///
    /// 带角色前缀的冲突列（demand_x / supply_x）使用 "Demand <x 的标签>" / "Supply <x 的标签>"；
    /// x 无标签时保留原名
    pub fn apply(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        let renames: Vec<(usize, String)> = table
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| self.label_for(name).map(|label| (idx, label)))
            .collect();

        for (idx, label) in &renames {
            table.rename_column(*idx, label);
        }

        let rows = table.row_count();
        diagnostics.stage(Stage::Present, "display labels", rows, rows);
        renames.len()
    }

    fn label_for(&self, name: &str) -> Option<String> {
        if let Some(label) = self.labels.get(name) {
            return Some(label.clone());
        }
        [(TableRole::Supply, "Supply"), (TableRole::Demand, "Demand")]
            .iter()
            .find_map(|(role, title)| {
                let field = name.strip_prefix(role.prefix())?;
                self.labels.get(field).map(|label| format!("{} {}", title, label))
            })
    }
}
