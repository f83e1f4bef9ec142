//! Scanner：按行区间顺序折叠的扫描契约
//!
//! 调用方对每个连续、升序的行区间调用一次 `scan`，绝不回访已扫描过的行；
//! `scan` 可以改写列映射（例如注入由累计状态派生的新列）。

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use tracing::trace;

use crate::column::{AnyColumn, ArrayColumn, Defined, TypedColumn};
use crate::common::{ColumnError, Result, RowId};
use crate::field_type::CType;
use crate::remap::RemapFilter;

/// 列映射的键：路径 + 类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub path:  String,
    pub ctype: CType,
}

impl ColumnKey {
    pub fn new(path: &str, ctype: CType) -> Self { Self { path: path.into(), ctype } }
}

pub type ColumnMap = BTreeMap<ColumnKey, AnyColumn>;

pub trait Scanner {
    type State;

    fn init(&self) -> Self::State;

    fn scan(&self, state: Self::State, columns: ColumnMap, range: Range<RowId>)
        -> (Self::State, ColumnMap);
}

/// 以严格顺序驱动扫描：区间必须非负、升序且互不重叠
pub fn scan_ranges<S, I>(scanner: &S, columns: ColumnMap, ranges: I) -> Result<(S::State, ColumnMap)>
where
    S: Scanner,
    I: IntoIterator<Item = Range<RowId>>,
{
    let mut state    = scanner.init();
    let mut columns  = columns;
    let mut next_row = 0 as RowId;

    for range in ranges {
        if range.start < next_row {
            return Err(ColumnError::ScanOrder(format!(
                "range {}..{} revisits rows before {}", range.start, range.end, next_row
            )));
        }
        if range.end < range.start {
            return Err(ColumnError::ScanOrder(format!(
                "range {}..{} is inverted", range.start, range.end
            )));
        }
        trace!(start = range.start, end = range.end, "scanning row range");
        next_row = range.end;
        (state, columns) = scanner.scan(state, columns, range);
    }
    Ok((state, columns))
}

// ── RunningSum ────────────────────────────────────────────────────────────────

/// 对一个 Long 列做累计求和，并把当前区间的累计值作为新列注入映射
#[derive(Debug, Clone)]
pub struct RunningSum {
    source: ColumnKey,
    output: ColumnKey,
}

impl RunningSum {
    pub fn new(source: &str, output: &str) -> Self {
        Self {
            source: ColumnKey::new(source, CType::Long),
            output: ColumnKey::new(output, CType::Long),
        }
    }
}

impl Scanner for RunningSum {
    type State = i64;

    fn init(&self) -> i64 { 0 }

    fn scan(&self, state: i64, mut columns: ColumnMap, range: Range<RowId>) -> (i64, ColumnMap) {
        let Some(source) = columns.get(&self.source).and_then(AnyColumn::as_long).cloned() else {
            return (state, columns);
        };

        let mut acc  = state;
        let sums: Vec<Option<i64>> = range.clone()
            .map(|row| {
                source.is_defined_at(row).then(|| {
                    acc += source.value(row);
                    acc
                })
            })
            .collect();

        // 派生列按绝对行号寻址：行 r 读取区间内第 r - start 个累计值
        let start   = range.start;
        let leaf    = ArrayColumn::from_options(CType::Long, sums);
        let derived = RemapFilter::new(leaf, move |row| row >= start, -start);
        columns.insert(self.output.clone(), AnyColumn::Long(Arc::new(derived)));
        (acc, columns)
    }
}
