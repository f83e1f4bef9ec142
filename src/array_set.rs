//! ArraySetColumn：多个同类型列合并为一个逻辑列
//!
//! 定义性为各后备列的并集；取值取**第一个**（下标最小的）在该行有定义的后备列，
//! 后面的列即使同样有定义也被遮蔽。通用 / 规范 / 文本取值都走同一条
//! "首个有定义下标"解析路径。
//!
//! 工厂 [`merge`] 按类型标签分派，每个分支产出具体类型的结果，读取时不再经过
//! 通用值路径。

use tracing::debug;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

use crate::column::leaf::marker_value;
use crate::column::{AnyColumn, Column, Defined, MarkerRef, TypedColumn, TypedRef, UndefinedColumn};
use crate::common::{undefined_access, ColumnError, Result, RowId};
use crate::definedness::{first_defined_value, UnionLots};
use crate::field_type::{CType, CValue, Period};

// ── ArraySetColumn ────────────────────────────────────────────────────────────

pub struct ArraySetColumn<C> {
    ctype: CType,
    gate:  UnionLots<C>,
}

impl<C: Column> ArraySetColumn<C> {
    /// `columns` 为空时直接 panic：没有后备列就没有可分派的类型
    pub fn new(ctype: CType, columns: Vec<C>) -> Self {
        assert!(!columns.is_empty(), "ArraySetColumn requires at least one backing column");
        Self { ctype, gate: UnionLots::new(columns) }
    }

    pub fn backing(&self) -> &[C] { self.gate.columns() }

    /// 在 `row` 处有定义的第一个后备列
    pub fn first_defined(&self, row: RowId) -> Option<&C> {
        self.gate.first_defined(row).map(|i| &self.gate.columns()[i])
    }

    fn resolve(&self, row: RowId) -> &C {
        match self.first_defined(row) {
            Some(c) => c,
            None    => undefined_access(&self.ctype, row),
        }
    }
}

impl<C: Defined> Defined for ArraySetColumn<C> {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl<C: Column> Column for ArraySetColumn<C> {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue { self.resolve(row).cvalue(row) }
    fn json_value(&self, row: RowId) -> JsonValue { self.resolve(row).json_value(row) }
    fn str_value(&self, row: RowId) -> String { self.resolve(row).str_value(row) }
}

impl<C: TypedColumn> TypedColumn for ArraySetColumn<C> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value { first_defined_value(&self.gate, &self.ctype, row) }
}

// ── 标记类型的合并 ────────────────────────────────────────────────────────────

/// Null / EmptyObject / EmptyArray 的合并：只有定义性
pub struct MarkerSetColumn {
    ctype: CType,
    gate:  UnionLots<MarkerRef>,
}

impl Defined for MarkerSetColumn {
    fn is_defined_at(&self, row: RowId) -> bool { self.gate.is_defined_at(row) }
}

impl Column for MarkerSetColumn {
    fn ctype(&self) -> CType { self.ctype.clone() }
    fn cvalue(&self, row: RowId) -> CValue {
        if !self.gate.is_defined_at(row) {
            undefined_access(&self.ctype, row);
        }
        marker_value(&self.ctype, row)
    }
}

// ── MergedColumn ──────────────────────────────────────────────────────────────

pub enum MergedColumn {
    Bool(ArraySetColumn<TypedRef<bool>>),
    Long(ArraySetColumn<TypedRef<i64>>),
    Double(ArraySetColumn<TypedRef<f64>>),
    Num(ArraySetColumn<TypedRef<BigDecimal>>),
    Str(ArraySetColumn<TypedRef<String>>),
    Date(ArraySetColumn<TypedRef<DateTime<Utc>>>),
    OffsetDateTime(ArraySetColumn<TypedRef<DateTime<FixedOffset>>>),
    LocalDateTime(ArraySetColumn<TypedRef<NaiveDateTime>>),
    LocalDate(ArraySetColumn<TypedRef<NaiveDate>>),
    LocalTime(ArraySetColumn<TypedRef<NaiveTime>>),
    Period(ArraySetColumn<TypedRef<Period>>),
    Array(ArraySetColumn<TypedRef<Vec<CValue>>>),
    Marker(MarkerSetColumn),
    Undefined(UndefinedColumn),
}

macro_rules! merged_dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            MergedColumn::Bool($c)           => $body,
            MergedColumn::Long($c)           => $body,
            MergedColumn::Double($c)         => $body,
            MergedColumn::Num($c)            => $body,
            MergedColumn::Str($c)            => $body,
            MergedColumn::Date($c)           => $body,
            MergedColumn::OffsetDateTime($c) => $body,
            MergedColumn::LocalDateTime($c)  => $body,
            MergedColumn::LocalDate($c)      => $body,
            MergedColumn::LocalTime($c)      => $body,
            MergedColumn::Period($c)         => $body,
            MergedColumn::Array($c)          => $body,
            MergedColumn::Marker($c)         => $body,
            MergedColumn::Undefined($c)      => $body,
        }
    };
}

impl MergedColumn {
    pub fn as_long(&self) -> Option<&ArraySetColumn<TypedRef<i64>>> {
        match self { Self::Long(c) => Some(c), _ => None }
    }
    pub fn as_str(&self) -> Option<&ArraySetColumn<TypedRef<String>>> {
        match self { Self::Str(c) => Some(c), _ => None }
    }
    pub fn as_array(&self) -> Option<&ArraySetColumn<TypedRef<Vec<CValue>>>> {
        match self { Self::Array(c) => Some(c), _ => None }
    }
}

impl Defined for MergedColumn {
    fn is_defined_at(&self, row: RowId) -> bool { merged_dispatch!(self, c => c.is_defined_at(row)) }
}

impl Column for MergedColumn {
    fn ctype(&self) -> CType { merged_dispatch!(self, c => c.ctype()) }
    fn cvalue(&self, row: RowId) -> CValue { merged_dispatch!(self, c => c.cvalue(row)) }
    fn json_value(&self, row: RowId) -> JsonValue { merged_dispatch!(self, c => c.json_value(row)) }
    fn str_value(&self, row: RowId) -> String { merged_dispatch!(self, c => c.str_value(row)) }
}

// ── 工厂 ──────────────────────────────────────────────────────────────────────

/// 按类型标签合并同类型列。
///
/// - `columns` 为空：panic（构造期断言）
/// - `CType::Undefined`：只用第一个后备列构造 `UndefinedColumn`，其余忽略
/// - 任一后备列类型与 `ctype` 不符：`ColumnError::TypeMismatch`
pub fn merge(ctype: &CType, mut columns: Vec<AnyColumn>) -> Result<MergedColumn> {
    assert!(!columns.is_empty(), "ArraySetColumn requires at least one backing column");

    debug!(ctype = %ctype, backing = columns.len(), "merging array-set column");

    macro_rules! arm {
        ($variant:ident) => {
            MergedColumn::$variant(typed(ctype, columns, |c| match c {
                AnyColumn::$variant(c) => Ok(c),
                other                  => Err(other),
            })?)
        };
    }

    let merged = match ctype {
        CType::Bool                => arm!(Bool),
        CType::Long                => arm!(Long),
        CType::Double              => arm!(Double),
        CType::Num                 => arm!(Num),
        CType::Str                 => arm!(Str),
        CType::Date                => arm!(Date),
        CType::OffsetDateTime      => arm!(OffsetDateTime),
        CType::LocalDateTime       => arm!(LocalDateTime),
        CType::LocalDate           => arm!(LocalDate),
        CType::LocalTime           => arm!(LocalTime),
        CType::Period              => arm!(Period),
        CType::HomogeneousArray(_) => arm!(Array),
        CType::Null | CType::EmptyObject | CType::EmptyArray => {
            let markers = typed(ctype, columns, |c| match c {
                AnyColumn::Marker(c) => Ok(c),
                other                => Err(other),
            })?;
            MergedColumn::Marker(MarkerSetColumn { ctype: ctype.clone(), gate: markers.gate })
        }
        CType::Undefined => MergedColumn::Undefined(UndefinedColumn::new(columns.swap_remove(0))),
    };
    Ok(merged)
}

/// 校验每个后备列的类型并取出具体分支
fn typed<T, F>(ctype: &CType, columns: Vec<AnyColumn>, extract: F) -> Result<ArraySetColumn<T>>
where
    T: Column,
    F: Fn(AnyColumn) -> std::result::Result<T, AnyColumn>,
{
    let mut out = Vec::with_capacity(columns.len());
    for column in columns {
        let found = column.ctype();
        if found != *ctype {
            return Err(ColumnError::TypeMismatch { expected: ctype.clone(), found });
        }
        match extract(column) {
            Ok(c)      => out.push(c),
            Err(other) => {
                return Err(ColumnError::TypeMismatch { expected: ctype.clone(), found: other.ctype() });
            }
        }
    }
    Ok(ArraySetColumn::new(ctype.clone(), out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitset::BitSet;
    use crate::column::{ArrayColumn, MarkerColumn};
    use std::sync::Arc;

    fn long_col(v: Vec<Option<i64>>) -> AnyColumn {
        AnyColumn::Long(Arc::new(ArrayColumn::from_options(CType::Long, v)))
    }

    #[test]
    fn first_defined_wins() {
        let a = long_col(vec![None, Some(1), None, Some(3)]);
        let b = long_col(vec![Some(10), Some(11), None, Some(13)]);
        let merged = merge(&CType::Long, vec![a, b]).unwrap();
        let longs = merged.as_long().unwrap();

        assert_eq!(longs.value(3), 3);
        assert_eq!(longs.value(0), 10);
        assert!(!merged.is_defined_at(2));
        // 通用取值与类型化取值走同一解析
        assert_eq!(merged.cvalue(3), CValue::Long(3));
        assert_eq!(merged.str_value(1), "1");
        assert_eq!(merged.json_value(0), serde_json::json!(10));
    }

    #[test]
    fn mismatched_backing_is_rejected() {
        let s = AnyColumn::Str(Arc::new(ArrayColumn::dense(CType::Str, vec!["x".to_string()])));
        let err = merge(&CType::Long, vec![long_col(vec![Some(1)]), s]).err().unwrap();
        assert!(matches!(err, ColumnError::TypeMismatch { expected: CType::Long, found: CType::Str }));
    }

    #[test]
    fn undefined_uses_first_backing_only() {
        let merged = merge(&CType::Undefined, vec![long_col(vec![Some(1)]), long_col(vec![Some(2)])]).unwrap();
        assert!(!merged.is_defined_at(0));
        assert_eq!(merged.ctype(), CType::Undefined);
        match merged {
            MergedColumn::Undefined(u) => assert_eq!(u.source().cvalue(0), CValue::Long(1)),
            _ => panic!("expected undefined column"),
        }
    }

    #[test]
    fn marker_merge_is_definedness_only() {
        let a: MarkerRef = Arc::new(MarkerColumn::null(BitSet::from_bools(&[true, false, false])));
        let b: MarkerRef = Arc::new(MarkerColumn::null(BitSet::from_bools(&[false, false, true])));
        let merged = merge(&CType::Null, vec![AnyColumn::Marker(a), AnyColumn::Marker(b)]).unwrap();
        assert!(merged.is_defined_at(0));
        assert!(!merged.is_defined_at(1));
        assert_eq!(merged.cvalue(2), CValue::Null);
    }

    #[test]
    fn homogeneous_arrays_merge_by_element_type() {
        let ctype = CType::array_of(CType::Long);
        let a = AnyColumn::Array(Arc::new(ArrayColumn::from_options(
            ctype.clone(),
            vec![Some(vec![CValue::Long(1)]), None],
        )));
        let b = AnyColumn::Array(Arc::new(ArrayColumn::from_options(
            ctype.clone(),
            vec![Some(vec![CValue::Long(9)]), Some(vec![CValue::Long(2), CValue::Long(3)])],
        )));
        let merged = merge(&ctype, vec![a, b]).unwrap();
        let arrays = merged.as_array().unwrap();
        assert_eq!(arrays.value(0), vec![CValue::Long(1)]);
        assert_eq!(merged.str_value(1), "[2,3]");

        let wrong = AnyColumn::Array(Arc::new(ArrayColumn::dense(CType::array_of(CType::Str), vec![Vec::<CValue>::new()])));
        assert!(merge(&ctype, vec![wrong]).is_err());
    }

    #[test]
    #[should_panic(expected = "at least one backing column")]
    fn empty_backing_panics() {
        let _ = merge(&CType::Long, Vec::new());
    }
}
