//! 叶子列：直接持有数据（或根本不持有数据）的列实现

use std::marker::PhantomData;
use std::ops::Range;

use crate::bitset::BitSet;
use crate::column::{AnyColumn, Column, Defined, TypedColumn};
use crate::common::{undefined_access, ColumnError, Result, RowId};
use crate::definedness::{Infinite, RangeGate};
use crate::field_type::{CType, CValue, ColumnValue};

// ── ArrayColumn ───────────────────────────────────────────────────────────────

/// 数组存储 + 显式定义性位图
///
/// 未定义行上的槽位仍占据一个值（占位），但永远不会被读取。
#[derive(Debug, Clone)]
pub struct ArrayColumn<T> {
    ctype:   CType,
    values:  Vec<T>,
    defined: BitSet,
}

impl<T: ColumnValue> ArrayColumn<T> {
    /// `values.len()` 必须等于 `defined.len()`
    pub fn new(ctype: CType, values: Vec<T>, defined: BitSet) -> Result<Self> {
        if values.len() != defined.len() {
            return Err(ColumnError::LengthMismatch {
                values:  values.len(),
                defined: defined.len(),
            });
        }
        Ok(Self { ctype, values, defined })
    }

    /// 所有行均有定义
    pub fn dense(ctype: CType, values: Vec<T>) -> Self {
        let defined = BitSet::all_set(values.len());
        Self { ctype, values, defined }
    }

    pub fn from_options(ctype: CType, values: Vec<Option<T>>) -> Self
    where
        T: Default,
    {
        let mut defined = BitSet::new(values.len());
        let values = values.into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Some(v) => { defined.set(i, true); v }
                None    => T::default(),
            })
            .collect();
        Self { ctype, values, defined }
    }

    pub fn len(&self)      -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool  { self.values.is_empty() }
    pub fn defined(&self)  -> &BitSet { &self.defined }
}

impl<T: ColumnValue> Defined for ArrayColumn<T> {
    fn is_defined_at(&self, row: RowId) -> bool { self.defined.contains(row) }
}

impl<T: ColumnValue> Column for ArrayColumn<T> {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { self.value(row).into_cvalue() }
}

impl<T: ColumnValue> TypedColumn for ArrayColumn<T> {
    type Value = T;
    /// 越界必 panic；界内未定义行只在 debug 下断言，release 返回占位值
    fn value(&self, row: RowId) -> T {
        debug_assert!(self.is_defined_at(row), "ArrayColumn read at undefined row {row}");
        match usize::try_from(row).ok().and_then(|i| self.values.get(i)) {
            Some(v) => v.clone(),
            None    => undefined_access(&self.ctype, row),
        }
    }
}

// ── ConstColumn ───────────────────────────────────────────────────────────────

/// 常量列：定义性由门控 `G` 决定（`Infinite` 或 `RangeGate`）
#[derive(Debug, Clone)]
pub struct ConstColumn<T, G> {
    ctype: CType,
    value: T,
    gate:  G,
}

impl<T: ColumnValue> ConstColumn<T, Infinite> {
    pub fn infinite(ctype: CType, value: T) -> Self {
        Self { ctype, value, gate: Infinite }
    }
}

impl<T: ColumnValue> ConstColumn<T, RangeGate> {
    pub fn ranged(ctype: CType, value: T, rows: Range<RowId>) -> Self {
        Self { ctype, value, gate: RangeGate::new(rows) }
    }
}

impl<T: ColumnValue, G: Defined> Defined for ConstColumn<T, G> {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl<T: ColumnValue, G: Defined + Send + Sync> Column for ConstColumn<T, G> {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { self.value(row).into_cvalue() }
}

impl<T: ColumnValue, G: Defined + Send + Sync> TypedColumn for ConstColumn<T, G> {
    type Value = T;
    fn value(&self, row: RowId) -> T {
        debug_assert!(self.gate.is_defined_at(row), "ConstColumn read at undefined row {row}");
        self.value.clone()
    }
}

// ── MarkerColumn ──────────────────────────────────────────────────────────────

/// 零信息列：Null / EmptyObject / EmptyArray，只有定义性
#[derive(Debug, Clone)]
pub struct MarkerColumn {
    ctype:   CType,
    defined: BitSet,
}

impl MarkerColumn {
    pub fn null(defined: BitSet)         -> Self { Self { ctype: CType::Null, defined } }
    pub fn empty_object(defined: BitSet) -> Self { Self { ctype: CType::EmptyObject, defined } }
    pub fn empty_array(defined: BitSet)  -> Self { Self { ctype: CType::EmptyArray, defined } }
}

impl Defined for MarkerColumn {
    fn is_defined_at(&self, row: RowId) -> bool { self.defined.contains(row) }
}

impl Column for MarkerColumn {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue {
        if !self.defined.contains(row) {
            undefined_access(&self.ctype, row);
        }
        marker_value(&self.ctype, row)
    }
}

/// 标记类型对应的唯一值
pub(crate) fn marker_value(ctype: &CType, row: RowId) -> CValue {
    match ctype {
        CType::Null        => CValue::Null,
        CType::EmptyObject => CValue::EmptyObject,
        CType::EmptyArray  => CValue::EmptyArray,
        other              => undefined_access(other, row),
    }
}

// ── EmptyColumn ───────────────────────────────────────────────────────────────

/// 永不定义的列；任何取值都会 panic
#[derive(Debug, Clone)]
pub struct EmptyColumn<T> {
    ctype: CType,
    _v:    PhantomData<fn() -> T>,
}

impl<T: ColumnValue> EmptyColumn<T> {
    pub fn new(ctype: CType) -> Self { Self { ctype, _v: PhantomData } }
}

impl<T: ColumnValue> Defined for EmptyColumn<T> {
    fn is_defined_at(&self, _row: RowId) -> bool { false }
}

impl<T: ColumnValue> Column for EmptyColumn<T> {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { undefined_access(&self.ctype, row) }
}

impl<T: ColumnValue> TypedColumn for EmptyColumn<T> {
    type Value = T;
    fn value(&self, row: RowId) -> T { undefined_access(&self.ctype, row) }
}

// ── UndefinedColumn ───────────────────────────────────────────────────────────

/// Undefined 类型的列：永不定义，保留构造它的源列
#[derive(Debug, Clone)]
pub struct UndefinedColumn {
    source: AnyColumn,
}

impl UndefinedColumn {
    pub fn new(source: AnyColumn) -> Self { Self { source } }
    pub fn source(&self) -> &AnyColumn { &self.source }
}

impl Defined for UndefinedColumn {
    fn is_defined_at(&self, _row: RowId) -> bool { false }
}

impl Column for UndefinedColumn {
    fn ctype(&self) -> CType { CType::Undefined }
    fn cvalue(&self, row: RowId) -> CValue { undefined_access(&CType::Undefined, row) }
}
