// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构造内存表、写出 CSV 夹具、读回 CSV 输出
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use steel_stock_matcher::{Table, TableRole, Value};
use tempfile::TempDir;

/// 按列名 + 行数据构造表
pub fn table(role: TableRole, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
    Table::from_rows(role, columns.iter().map(|s| s.to_string()).collect(), rows)
}

/// 供应表单行（标准字段顺序: grade, finish, thickness, width, weight, quantity）
pub fn supply_row(
    grade: &str,
    finish: &str,
    thickness: f64,
    width: f64,
    weight: Option<f64>,
    quantity: Option<f64>,
) -> Vec<Value> {
    vec![
        Value::from(grade),
        Value::from(finish),
        Value::Number(thickness),
        Value::Number(width),
        Value::from(weight),
        Value::from(quantity),
    ]
}

pub const SUPPLY_COLUMNS: [&str; 6] = ["grade", "finish", "thickness", "width", "weight", "quantity"];

pub const DEMAND_COLUMNS: [&str; 7] = [
    "buyer_id",
    "preferred_grade",
    "preferred_finish",
    "preferred_thickness",
    "preferred_width",
    "max_weight",
    "min_quantity",
];

/// 需求表单行（标准字段顺序，见 DEMAND_COLUMNS）
pub fn demand_row(
    buyer_id: &str,
    grade: Option<&str>,
    finish: &str,
    thickness: f64,
    width: f64,
    max_weight: Option<f64>,
    min_quantity: Option<f64>,
) -> Vec<Value> {
    vec![
        Value::from(buyer_id),
        Value::from(grade),
        Value::from(finish),
        Value::Number(thickness),
        Value::Number(width),
        Value::from(max_weight),
        Value::from(min_quantity),
    ]
}

/// 标准夹具: A36 / matte / 2.0 / 100.0，weight 50，quantity 10
pub fn fixture_supply() -> Table {
    table(
        TableRole::Supply,
        &SUPPLY_COLUMNS,
        vec![supply_row("A36", "matte", 2.0, 100.0, Some(50.0), Some(10.0))],
    )
}

/// 标准夹具: B1 需求 A36 / matte / 2.0 / 100.0，max_weight 60，min_quantity 5
pub fn fixture_demand(max_weight: Option<f64>) -> Table {
    table(
        TableRole::Demand,
        &DEMAND_COLUMNS,
        vec![demand_row(
            "B1",
            Some("A36"),
            "matte",
            2.0,
            100.0,
            max_weight,
            Some(5.0),
        )],
    )
}

/// 在临时目录中写出 CSV 夹具
pub fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(path)
}

/// 读回 CSV 输出（表头 + 数据行）
pub fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}
