use std::cell::Cell;
use std::sync::OnceLock;
use std::time::Instant;

static PERF_ENABLED: OnceLock<bool> = OnceLock::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 阶段耗时统计开关
///
/// - Debug 默认开启；Release 默认关闭
/// - `STEEL_STOCK_MATCHER_PERF=1` 强制开启，`=0` 强制关闭
pub fn perf_enabled() -> bool {
    *PERF_ENABLED.get_or_init(|| match std::env::var("STEEL_STOCK_MATCHER_PERF") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    })
}

/// 性能统计 Guard：记录 elapsed_ms + 嵌套深度
///
/// 使用方式：
/// ```ignore
/// let _perf = steel_stock_matcher::perf::PerfGuard::new("match");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth.saturating_add(1));
            depth
        });
        Self {
            op,
            start: Instant::now(),
            depth,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));

        if !perf_enabled() {
            return;
        }

        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(
            target: "perf",
            op = self.op,
            depth = self.depth,
            elapsed_ms,
            "done"
        );
    }
}
