//! 行变换组合子
//!
//! 零拷贝地改变行号到委托行号的映射；定义性与取值走同一条映射路径。
//!
//! ```text
//!   Concat(at, c1, c2)        row < at → c1[row]      row ≥ at → c2[row - at]
//!   NConcat(offsets, cols)    二分定位段 i → cols[i][row - offsets[i]]
//!   Remap(c, f)               c[f(row)]
//!   RemapFilter(c, p, off)    p(row) → c[row + off]
//!   RemapIndices(c, idx)      c[idx[row]]
//!   Sparsen(c, idx, size)     remap[idx[i]] = i（先写者胜）→ c[remap[row]]
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::column::{Column, Defined, TypedColumn};
use crate::common::{undefined_access, ColumnError, Result, RowId};
use crate::field_type::{CType, CValue};

// ── Concat ────────────────────────────────────────────────────────────────────

/// 两路拼接：`[0, at)` 来自 c1，`[at, ∞)` 来自 c2（行号减去 at）
#[derive(Debug, Clone)]
pub struct Concat<A, B> {
    at: RowId,
    c1: A,
    c2: B,
}

impl<A, B> Concat<A, B> {
    pub fn new(at: RowId, c1: A, c2: B) -> Self { Self { at, c1, c2 } }

    /// 行号归属：`None` 表示负行或 `row - at` 溢出
    fn side(&self, row: RowId) -> Option<Side> {
        if row < 0 {
            None
        } else if row < self.at {
            Some(Side::First(row))
        } else {
            row.checked_sub(self.at).map(Side::Second)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    First(RowId),
    Second(RowId),
}

impl<A: Defined, B: Defined> Defined for Concat<A, B> {
    fn is_defined_at(&self, row: RowId) -> bool {
        match self.side(row) {
            Some(Side::First(r))  => self.c1.is_defined_at(r),
            Some(Side::Second(r)) => self.c2.is_defined_at(r),
            None                  => false,
        }
    }
}

impl<A: Column, B: Column> Column for Concat<A, B> {
    fn ctype(&self) -> CType { self.c1.ctype() }
    fn cvalue(&self, row: RowId) -> CValue {
        match self.side(row) {
            Some(Side::First(r))  => self.c1.cvalue(r),
            Some(Side::Second(r)) => self.c2.cvalue(r),
            None                  => undefined_access(&self.ctype(), row),
        }
    }
}

impl<A, B> TypedColumn for Concat<A, B>
where
    A: TypedColumn,
    B: TypedColumn<Value = A::Value>,
{
    type Value = A::Value;
    fn value(&self, row: RowId) -> A::Value {
        match self.side(row) {
            Some(Side::First(r))  => self.c1.value(r),
            Some(Side::Second(r)) => self.c2.value(r),
            None                  => undefined_access(&self.ctype(), row),
        }
    }
}

// ── NConcat ───────────────────────────────────────────────────────────────────

/// N 路拼接。段 i 覆盖 `[offsets[i], offsets[i+1])`，最后一段向后无界。
///
/// `last` 缓存上一次命中的段号，仅作为性能提示：每次使用前都会重新做边界
/// 检查，不命中则回退到二分查找。多线程并发读写该缓存不需要加锁。
#[derive(Debug)]
pub struct NConcat<C> {
    offsets: Vec<RowId>,
    columns: Vec<C>,
    last:    AtomicUsize,
}

impl<C> NConcat<C> {
    /// `offsets` 必须严格递增且与 `columns` 等长
    pub fn new(offsets: Vec<RowId>, columns: Vec<C>) -> Result<Self> {
        if offsets.len() != columns.len() {
            return Err(ColumnError::InvalidSegments(format!(
                "{} offsets for {} columns", offsets.len(), columns.len()
            )));
        }
        if let Some(w) = offsets.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ColumnError::InvalidSegments(format!(
                "offsets not strictly ascending: {} then {}", w[0], w[1]
            )));
        }
        Ok(Self { offsets, columns, last: AtomicUsize::new(0) })
    }

    pub fn offsets(&self) -> &[RowId] { &self.offsets }
    pub fn columns(&self) -> &[C] { &self.columns }

    /// 段号查找：先验证缓存段，再二分
    pub fn segment_for(&self, row: RowId) -> Option<usize> {
        if row < 0 || self.offsets.is_empty() {
            return None;
        }
        let cached = self.last.load(Ordering::Relaxed);
        if self.bounds(cached, row) {
            return Some(cached);
        }
        let idx = match self.offsets.binary_search(&row) {
            Ok(i)  => i,
            Err(0) => return None, // 第一段之前
            Err(i) => i - 1,
        };
        self.last.store(idx, Ordering::Relaxed);
        Some(idx)
    }

    fn bounds(&self, seg: usize, row: RowId) -> bool {
        match self.offsets.get(seg) {
            Some(&start) => {
                start <= row && self.offsets.get(seg + 1).map_or(true, |&next| row < next)
            }
            None => false,
        }
    }

    fn locate(&self, row: RowId) -> Option<(&C, RowId)> {
        let i = self.segment_for(row)?;
        Some((&self.columns[i], row.checked_sub(self.offsets[i])?))
    }
}

impl<C: Defined> Defined for NConcat<C> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.locate(row).is_some_and(|(c, local)| c.is_defined_at(local))
    }
}

impl<C: Column> Column for NConcat<C> {
    fn ctype(&self) -> CType {
        self.columns.first().map_or(CType::Undefined, Column::ctype)
    }
    fn cvalue(&self, row: RowId) -> CValue {
        match self.locate(row) {
            Some((c, local)) => c.cvalue(local),
            None             => undefined_access(&self.ctype(), row),
        }
    }
}

impl<C: TypedColumn> TypedColumn for NConcat<C> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value {
        match self.locate(row) {
            Some((c, local)) => c.value(local),
            None             => undefined_access(&self.ctype(), row),
        }
    }
}

// ── Remap ─────────────────────────────────────────────────────────────────────

/// 任意行号变换（旋转、反转、join 重排……）
pub struct Remap<C, F> {
    delegate: C,
    f:        F,
}

impl<C, F: Fn(RowId) -> RowId> Remap<C, F> {
    pub fn new(delegate: C, f: F) -> Self { Self { delegate, f } }
}

impl<C: Defined, F: Fn(RowId) -> RowId> Defined for Remap<C, F> {
    fn is_defined_at(&self, row: RowId) -> bool { self.delegate.is_defined_at((self.f)(row)) }
}

impl<C: Column, F: Fn(RowId) -> RowId + Send + Sync> Column for Remap<C, F> {
    fn ctype(&self) -> CType { self.delegate.ctype() }
    fn cvalue(&self, row: RowId) -> CValue { self.delegate.cvalue((self.f)(row)) }
}

impl<C: TypedColumn, F: Fn(RowId) -> RowId + Send + Sync> TypedColumn for Remap<C, F> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value { self.delegate.value((self.f)(row)) }
}

// ── RemapFilter ───────────────────────────────────────────────────────────────

/// 谓词过滤 + 固定偏移：`row ≥ 0 && filter(row) && c.def(row + offset)`
pub struct RemapFilter<C, P> {
    delegate: C,
    filter:   P,
    offset:   RowId,
}

impl<C, P: Fn(RowId) -> bool> RemapFilter<C, P> {
    pub fn new(delegate: C, filter: P, offset: RowId) -> Self {
        Self { delegate, filter, offset }
    }

    fn source_row(&self, row: RowId) -> Option<RowId> {
        if row >= 0 && (self.filter)(row) { row.checked_add(self.offset) } else { None }
    }
}

impl<C: Defined, P: Fn(RowId) -> bool> Defined for RemapFilter<C, P> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.source_row(row).is_some_and(|src| self.delegate.is_defined_at(src))
    }
}

impl<C: Column, P: Fn(RowId) -> bool + Send + Sync> Column for RemapFilter<C, P> {
    fn ctype(&self) -> CType { self.delegate.ctype() }
    fn cvalue(&self, row: RowId) -> CValue {
        match self.source_row(row) {
            Some(src) => self.delegate.cvalue(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

impl<C: TypedColumn, P: Fn(RowId) -> bool + Send + Sync> TypedColumn for RemapFilter<C, P> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value {
        match self.source_row(row) {
            Some(src) => self.delegate.value(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

// ── RemapIndices ──────────────────────────────────────────────────────────────

/// 显式下标表：输出行 i 对应委托行 `indices[i]`
#[derive(Debug, Clone)]
pub struct RemapIndices<C> {
    delegate: C,
    indices:  Vec<RowId>,
}

impl<C> RemapIndices<C> {
    pub fn new(delegate: C, indices: Vec<RowId>) -> Self { Self { delegate, indices } }

    fn source_row(&self, row: RowId) -> Option<RowId> {
        usize::try_from(row).ok().and_then(|i| self.indices.get(i).copied())
    }
}

impl<C: Defined> Defined for RemapIndices<C> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.source_row(row).is_some_and(|src| self.delegate.is_defined_at(src))
    }
}

impl<C: Column> Column for RemapIndices<C> {
    fn ctype(&self) -> CType { self.delegate.ctype() }
    fn cvalue(&self, row: RowId) -> CValue {
        match self.source_row(row) {
            Some(src) => self.delegate.cvalue(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

impl<C: TypedColumn> TypedColumn for RemapIndices<C> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value {
        match self.source_row(row) {
            Some(src) => self.delegate.value(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

// ── Sparsen ───────────────────────────────────────────────────────────────────

/// 稀疏化：源行 i 被放到目标行 `idx[i]`，其余目标行为空洞（-1）
///
/// 多个源行指向同一目标行时，先写者胜。
#[derive(Debug, Clone)]
pub struct Sparsen<C> {
    delegate: C,
    remap:    Vec<RowId>,
}

impl<C> Sparsen<C> {
    /// `idx` 中每个目标行必须落在 `[0, to_size)` 内
    pub fn new(delegate: C, idx: &[RowId], to_size: usize) -> Result<Self> {
        let mut remap = vec![-1 as RowId; to_size];
        let mut shadowed = 0usize;
        for (i, &target) in idx.iter().enumerate() {
            let slot = usize::try_from(target)
                .ok()
                .and_then(|t| remap.get_mut(t))
                .ok_or(ColumnError::IndexOutOfRange { index: target, size: to_size })?;
            if *slot == -1 {
                *slot = i as RowId;
            } else {
                shadowed += 1;
            }
        }
        debug!(sources = idx.len(), to_size, shadowed, "sparsen remap built");
        Ok(Self { delegate, remap })
    }

    /// 目标行 → 源行（-1 表示空洞）
    pub fn remap(&self) -> &[RowId] { &self.remap }

    fn source_row(&self, row: RowId) -> Option<RowId> {
        usize::try_from(row)
            .ok()
            .and_then(|i| self.remap.get(i).copied())
            .filter(|&src| src != -1)
    }
}

impl<C: Defined> Defined for Sparsen<C> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.source_row(row).is_some_and(|src| self.delegate.is_defined_at(src))
    }
}

impl<C: Column> Column for Sparsen<C> {
    fn ctype(&self) -> CType { self.delegate.ctype() }
    fn cvalue(&self, row: RowId) -> CValue {
        match self.source_row(row) {
            Some(src) => self.delegate.cvalue(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

impl<C: TypedColumn> TypedColumn for Sparsen<C> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value {
        match self.source_row(row) {
            Some(src) => self.delegate.value(src),
            None      => undefined_access(&self.ctype(), row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ArrayColumn;

    fn longs(v: &[i64]) -> ArrayColumn<i64> { ArrayColumn::dense(CType::Long, v.to_vec()) }

    #[test]
    fn concat_boundary_reads_second_column() {
        let c = Concat::new(5, longs(&[0, 1, 2, 3, 4, 5]), longs(&[100, 101]));
        assert_eq!(c.value(5), 100);
        assert_eq!(c.value(4), 4);
        assert_eq!(c.value(6), 101);
        assert!(!c.is_defined_at(7));
        assert!(!c.is_defined_at(-1));
    }

    #[test]
    fn extreme_rows_are_undefined_not_overflow() {
        let c = Concat::new(-3, longs(&[1]), longs(&[2, 3]));
        assert!(!c.is_defined_at(i64::MAX));
        assert!(!c.is_defined_at(i64::MIN));
        assert!(c.checked_value(i64::MAX).is_err());

        let f = RemapFilter::new(longs(&[1, 2]), |_| true, 1);
        assert!(!f.is_defined_at(i64::MAX));
        assert!(!f.is_defined_at(i64::MIN));
        assert_eq!(f.value(0), 2);

        let back = RemapFilter::new(longs(&[1, 2]), |_| true, i64::MIN);
        assert!(!back.is_defined_at(i64::MAX - 1));

        let n = NConcat::new(vec![-5, 0], vec![longs(&[7]), longs(&[8])]).unwrap();
        assert!(!n.is_defined_at(i64::MAX));
        assert_eq!(n.value(0), 8);
        let lone = NConcat::new(vec![-5], vec![longs(&[7])]).unwrap();
        assert!(!lone.is_defined_at(i64::MAX));
    }

    #[test]
    fn nconcat_segments() {
        let cols = vec![longs(&[0, 1, 2]), longs(&[3, 4, 5, 6]), longs(&[7, 8])];
        let n = NConcat::new(vec![0, 3, 7], cols).unwrap();
        assert_eq!(n.segment_for(2), Some(0));
        assert_eq!(n.segment_for(3), Some(1));
        assert_eq!(n.segment_for(6), Some(1));
        assert_eq!(n.segment_for(7), Some(2));
        assert_eq!(n.segment_for(100), Some(2));
        assert_eq!(n.segment_for(-1), None);
        assert_eq!(n.value(4), 4);
        assert_eq!(n.value(8), 8);
        assert!(!n.is_defined_at(9));
    }

    #[test]
    fn nconcat_rows_before_first_offset_are_undefined() {
        let n = NConcat::new(vec![2], vec![longs(&[1])]).unwrap();
        assert_eq!(n.segment_for(1), None);
        assert!(!n.is_defined_at(0));
        assert_eq!(n.value(2), 1);
    }

    #[test]
    fn nconcat_rejects_bad_offsets() {
        assert!(matches!(
            NConcat::new(vec![0, 0], vec![longs(&[1]), longs(&[2])]),
            Err(ColumnError::InvalidSegments(_))
        ));
        assert!(NConcat::new(vec![0], vec![longs(&[1]), longs(&[2])]).is_err());
    }

    #[test]
    fn remap_reverses() {
        let r = Remap::new(longs(&[1, 2, 3]), |row| 2 - row);
        assert_eq!(r.value(0), 3);
        assert_eq!(r.value(2), 1);
        assert!(!r.is_defined_at(3));
    }

    #[test]
    fn remap_filter_applies_offset() {
        let f = RemapFilter::new(longs(&[10, 11, 12, 13]), |row| row % 2 == 0, 1);
        assert!(f.is_defined_at(0));
        assert_eq!(f.value(0), 11);
        assert!(!f.is_defined_at(1));
        assert_eq!(f.value(2), 13);
        assert!(!f.is_defined_at(4));
        assert!(!f.is_defined_at(-2));
    }

    #[test]
    fn remap_indices_bounds() {
        let r = RemapIndices::new(longs(&[5, 6, 7]), vec![2, 0, 9]);
        assert_eq!(r.value(0), 7);
        assert_eq!(r.value(1), 5);
        assert!(!r.is_defined_at(2));
        assert!(!r.is_defined_at(3));
        assert!(!r.is_defined_at(-1));
    }

    #[test]
    fn sparsen_first_writer_wins() {
        let s = Sparsen::new(longs(&[40, 41, 42]), &[2, 2, 5], 6).unwrap();
        assert_eq!(s.remap(), &[-1, -1, 0, -1, -1, 2]);
        assert_eq!(s.value(2), 40);
        assert_eq!(s.value(5), 42);
        assert!(!s.is_defined_at(0));
        assert!(!s.is_defined_at(6));
    }

    #[test]
    fn sparsen_rejects_out_of_range_target() {
        let err = Sparsen::new(longs(&[1]), &[6], 6).unwrap_err();
        assert!(matches!(err, ColumnError::IndexOutOfRange { index: 6, size: 6 }));
    }
}
