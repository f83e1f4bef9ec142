//! 定义性组合子
//!
//! 只根据委托列计算 presence，不读取值（Map1/Map2 的值函数、Union 的首个定义源、
//! And/Or-Lots 的布尔折叠除外）。
//!
//! | 组合子           | is_defined_at(row)                 |
//! |------------------|------------------------------------|
//! | Map1             | c.def(row)                         |
//! | Map2             | c1.def(row) && c2.def(row)         |
//! | Union            | c1.def(row) \|\| c2.def(row)       |
//! | UnionLots        | 任一委托有定义                     |
//! | Intersect(Lots)  | 全部委托有定义                     |
//! | AndLots / OrLots | 同 UnionLots；值为已定义委托的折叠 |

use std::marker::PhantomData;
use std::ops::Range;

use crate::column::{Column, Defined, TypedColumn};
use crate::common::{undefined_access, RowId};
use crate::field_type::{CType, CValue, ColumnValue};

// ── 基础门控 ──────────────────────────────────────────────────────────────────

/// 处处有定义
#[derive(Debug, Clone, Copy, Default)]
pub struct Infinite;

impl Defined for Infinite {
    fn is_defined_at(&self, _row: RowId) -> bool { true }
}

/// 仅在给定区间内有定义
#[derive(Debug, Clone)]
pub struct RangeGate {
    rows: Range<RowId>,
}

impl RangeGate {
    pub fn new(rows: Range<RowId>) -> Self { Self { rows } }
    pub fn rows(&self) -> &Range<RowId> { &self.rows }
}

impl Defined for RangeGate {
    fn is_defined_at(&self, row: RowId) -> bool { self.rows.contains(&row) }
}

// ── Map1 ──────────────────────────────────────────────────────────────────────

/// 单输入映射：定义性原样透传，值经过 `f`
pub struct Map1<C, F, T> {
    delegate: C,
    ctype:    CType,
    f:        F,
    _out:     PhantomData<fn() -> T>,
}

impl<C, F, T> Map1<C, F, T>
where
    C: TypedColumn,
    F: Fn(C::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    pub fn new(delegate: C, ctype: CType, f: F) -> Self {
        Self { delegate, ctype, f, _out: PhantomData }
    }
}

impl<C: Defined, F, T> Defined for Map1<C, F, T> {
    fn is_defined_at(&self, row: RowId) -> bool { self.delegate.is_defined_at(row) }
}

impl<C, F, T> Column for Map1<C, F, T>
where
    C: TypedColumn,
    F: Fn(C::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { self.value(row).into_cvalue() }
}

impl<C, F, T> TypedColumn for Map1<C, F, T>
where
    C: TypedColumn,
    F: Fn(C::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    type Value = T;
    fn value(&self, row: RowId) -> T { (self.f)(self.delegate.value(row)) }
}

// ── Map2 ──────────────────────────────────────────────────────────────────────

/// 二元逐行运算：两侧都有定义时才有定义
pub struct Map2<A, B, F, T> {
    gate:  Intersect<A, B>,
    ctype: CType,
    f:     F,
    _out:  PhantomData<fn() -> T>,
}

impl<A, B, F, T> Map2<A, B, F, T>
where
    A: TypedColumn,
    B: TypedColumn,
    F: Fn(A::Value, B::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    pub fn new(c1: A, c2: B, ctype: CType, f: F) -> Self {
        Self { gate: Intersect::new(c1, c2), ctype, f, _out: PhantomData }
    }
}

impl<A: Defined, B: Defined, F, T> Defined for Map2<A, B, F, T> {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl<A, B, F, T> Column for Map2<A, B, F, T>
where
    A: TypedColumn,
    B: TypedColumn,
    F: Fn(A::Value, B::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { self.value(row).into_cvalue() }
}

impl<A, B, F, T> TypedColumn for Map2<A, B, F, T>
where
    A: TypedColumn,
    B: TypedColumn,
    F: Fn(A::Value, B::Value) -> T + Send + Sync,
    T: ColumnValue,
{
    type Value = T;
    fn value(&self, row: RowId) -> T {
        (self.f)(self.gate.c1.value(row), self.gate.c2.value(row))
    }
}

// ── Union ─────────────────────────────────────────────────────────────────────

/// 同一逻辑列的两个备选来源；取值时 c1 优先
#[derive(Debug, Clone)]
pub struct Union<A, B> {
    pub c1: A,
    pub c2: B,
}

impl<A, B> Union<A, B> {
    pub fn new(c1: A, c2: B) -> Self { Self { c1, c2 } }
}

impl<A: Defined, B: Defined> Defined for Union<A, B> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.c1.is_defined_at(row) || self.c2.is_defined_at(row)
    }
}

impl<A: Column, B: Column> Column for Union<A, B> {
    fn ctype(&self) -> CType { self.c1.ctype() }
    fn cvalue(&self, row: RowId) -> CValue {
        if self.c1.is_defined_at(row) { self.c1.cvalue(row) } else { self.c2.cvalue(row) }
    }
}

impl<A, B> TypedColumn for Union<A, B>
where
    A: TypedColumn,
    B: TypedColumn<Value = A::Value>,
{
    type Value = A::Value;
    fn value(&self, row: RowId) -> A::Value {
        if self.c1.is_defined_at(row) { self.c1.value(row) } else { self.c2.value(row) }
    }
}

// ── UnionLots ─────────────────────────────────────────────────────────────────

/// N 路并集：按下标升序找到第一个有定义的委托即短路
#[derive(Debug, Clone)]
pub struct UnionLots<C> {
    columns: Vec<C>,
}

impl<C: Defined> UnionLots<C> {
    pub fn new(columns: Vec<C>) -> Self { Self { columns } }

    /// 在 `row` 处有定义的第一个委托的下标
    pub fn first_defined(&self, row: RowId) -> Option<usize> {
        self.columns.iter().position(|c| c.is_defined_at(row))
    }

    pub fn columns(&self) -> &[C] { &self.columns }
}

impl<C: Defined> Defined for UnionLots<C> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.columns.iter().any(|c| c.is_defined_at(row))
    }
}

// ── Intersect ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Intersect<A, B> {
    pub c1: A,
    pub c2: B,
}

impl<A, B> Intersect<A, B> {
    pub fn new(c1: A, c2: B) -> Self { Self { c1, c2 } }
}

impl<A: Defined, B: Defined> Defined for Intersect<A, B> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.c1.is_defined_at(row) && self.c2.is_defined_at(row)
    }
}

/// N 路交集：遇到第一个未定义的委托即短路
#[derive(Debug, Clone)]
pub struct IntersectLots<C> {
    columns: Vec<C>,
}

impl<C: Defined> IntersectLots<C> {
    pub fn new(columns: Vec<C>) -> Self { Self { columns } }
}

impl<C: Defined> Defined for IntersectLots<C> {
    fn is_defined_at(&self, row: RowId) -> bool {
        self.columns.iter().all(|c| c.is_defined_at(row))
    }
}

// ── AndLots / OrLots ──────────────────────────────────────────────────────────

/// 布尔 N 路 AND：只折叠在该行有定义的委托，初值 true
pub struct AndLots<C> {
    gate: UnionLots<C>,
}

impl<C: TypedColumn<Value = bool>> AndLots<C> {
    pub fn new(columns: Vec<C>) -> Self { Self { gate: UnionLots::new(columns) } }
}

impl<C: Defined> Defined for AndLots<C> {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl<C: TypedColumn<Value = bool>> Column for AndLots<C> {
    fn ctype(&self) -> CType { CType::Bool }
    fn cvalue(&self, row: RowId) -> CValue { CValue::Bool(self.value(row)) }
}

impl<C: TypedColumn<Value = bool>> TypedColumn for AndLots<C> {
    type Value = bool;
    /// 全部委托未定义时 release 下返回初值 true；用 `checked_value` 拒绝
    fn value(&self, row: RowId) -> bool {
        debug_assert!(self.gate.is_defined_at(row), "AndLots read at undefined row {row}");
        fold_defined(self.gate.columns(), row, true, |acc, v| acc && v)
    }
}

/// 布尔 N 路 OR：只折叠在该行有定义的委托，初值 false
pub struct OrLots<C> {
    gate: UnionLots<C>,
}

impl<C: TypedColumn<Value = bool>> OrLots<C> {
    pub fn new(columns: Vec<C>) -> Self { Self { gate: UnionLots::new(columns) } }
}

impl<C: Defined> Defined for OrLots<C> {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl<C: TypedColumn<Value = bool>> Column for OrLots<C> {
    fn ctype(&self) -> CType { CType::Bool }
    fn cvalue(&self, row: RowId) -> CValue { CValue::Bool(self.value(row)) }
}

impl<C: TypedColumn<Value = bool>> TypedColumn for OrLots<C> {
    type Value = bool;
    /// 全部委托未定义时 release 下返回初值 false；用 `checked_value` 拒绝
    fn value(&self, row: RowId) -> bool {
        debug_assert!(self.gate.is_defined_at(row), "OrLots read at undefined row {row}");
        fold_defined(self.gate.columns(), row, false, |acc, v| acc || v)
    }
}

fn fold_defined<C: TypedColumn<Value = bool>>(
    columns: &[C],
    row:     RowId,
    init:    bool,
    op:      impl Fn(bool, bool) -> bool,
) -> bool {
    columns.iter()
        .filter(|c| c.is_defined_at(row))
        .fold(init, |acc, c| op(acc, c.value(row)))
}

/// 读取 UnionLots 中第一个有定义委托的值；都未定义则中止
pub(crate) fn first_defined_value<C: TypedColumn>(
    gate:  &UnionLots<C>,
    ctype: &CType,
    row:   RowId,
) -> C::Value {
    match gate.first_defined(row) {
        Some(i) => gate.columns()[i].value(row),
        None    => undefined_access(ctype, row),
    }
}
