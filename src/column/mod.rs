//! 列能力接口
//!
//! ```text
//!   Defined        is_defined_at(row)            : 定义性（presence）
//!     └─ Column    ctype / cvalue / json / text  : 与类型无关的读取
//!          └─ TypedColumn  value(row) -> Value   : 类型化的快速读取
//! ```
//!
//! 所有取值方法的前置条件都是 `is_defined_at(row)`；违反即 panic。
//! `checked_*` 方法是带检查的入口，未定义时返回 `ColumnError::NotDefined`。

pub mod leaf;

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

use crate::common::{ColumnError, Result, RowId};
use crate::field_type::{CType, CValue, ColumnValue, Period};

pub use leaf::{ArrayColumn, ConstColumn, EmptyColumn, MarkerColumn, UndefinedColumn};

// ── 能力 trait ────────────────────────────────────────────────────────────────

/// 定义性：对任意整数行号都给出结果，越界 / 负数为 false
pub trait Defined {
    fn is_defined_at(&self, row: RowId) -> bool;
}

pub trait Column: Defined + Send + Sync {
    fn ctype(&self) -> CType;

    /// 规范值。前置条件：`is_defined_at(row)`
    fn cvalue(&self, row: RowId) -> CValue;

    /// 通用 JSON 值。前置条件同 `cvalue`
    fn json_value(&self, row: RowId) -> JsonValue {
        self.cvalue(row).to_json()
    }

    /// 文本形式。前置条件同 `cvalue`
    fn str_value(&self, row: RowId) -> String {
        self.cvalue(row).to_string()
    }

    fn checked_cvalue(&self, row: RowId) -> Result<CValue> {
        if self.is_defined_at(row) {
            Ok(self.cvalue(row))
        } else {
            Err(ColumnError::NotDefined { row })
        }
    }
}

pub trait TypedColumn: Column {
    type Value: ColumnValue;

    /// 类型化取值（未检查的快速路径）。前置条件：`is_defined_at(row)`
    ///
    /// release 构建下不保证对未定义行报错：部分实现会返回占位值（叶子列的
    /// `T::default()`、AndLots/OrLots 的折叠初值）。需要“未定义绝不返回值”
    /// 时使用 `checked_value`。
    fn value(&self, row: RowId) -> Self::Value;

    fn checked_value(&self, row: RowId) -> Result<Self::Value> {
        if self.is_defined_at(row) {
            Ok(self.value(row))
        } else {
            Err(ColumnError::NotDefined { row })
        }
    }
}

// ── 共享委托：Arc<C> 与 C 行为一致 ─────────────────────────────────────────────

impl<D: Defined + ?Sized> Defined for Arc<D> {
    fn is_defined_at(&self, row: RowId) -> bool { (**self).is_defined_at(row) }
}

impl<C: Column + ?Sized> Column for Arc<C> {
    fn ctype(&self) -> CType { (**self).ctype() }
    fn cvalue(&self, row: RowId) -> CValue { (**self).cvalue(row) }
    fn json_value(&self, row: RowId) -> JsonValue { (**self).json_value(row) }
    fn str_value(&self, row: RowId) -> String { (**self).str_value(row) }
}

impl<C: TypedColumn + ?Sized> TypedColumn for Arc<C> {
    type Value = C::Value;
    fn value(&self, row: RowId) -> C::Value { (**self).value(row) }
}

/// 类型擦除后的共享列
pub type TypedRef<T> = Arc<dyn TypedColumn<Value = T>>;
/// 标记类型列（Null / EmptyObject / EmptyArray / Undefined）
pub type MarkerRef = Arc<dyn Column>;

// ── AnyColumn：按类型标签分派的列 ─────────────────────────────────────────────

#[derive(Clone)]
pub enum AnyColumn {
    Bool(TypedRef<bool>),
    Long(TypedRef<i64>),
    Double(TypedRef<f64>),
    Num(TypedRef<BigDecimal>),
    Str(TypedRef<String>),
    Date(TypedRef<DateTime<Utc>>),
    OffsetDateTime(TypedRef<DateTime<FixedOffset>>),
    LocalDateTime(TypedRef<NaiveDateTime>),
    LocalDate(TypedRef<NaiveDate>),
    LocalTime(TypedRef<NaiveTime>),
    Period(TypedRef<Period>),
    /// 同构数组；元素类型由内部列的 `ctype()` 给出
    Array(TypedRef<Vec<CValue>>),
    Marker(MarkerRef),
}

/// 对 AnyColumn 的每个分支执行同一表达式
macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            AnyColumn::Bool($c)           => $body,
            AnyColumn::Long($c)           => $body,
            AnyColumn::Double($c)         => $body,
            AnyColumn::Num($c)            => $body,
            AnyColumn::Str($c)            => $body,
            AnyColumn::Date($c)           => $body,
            AnyColumn::OffsetDateTime($c) => $body,
            AnyColumn::LocalDateTime($c)  => $body,
            AnyColumn::LocalDate($c)      => $body,
            AnyColumn::LocalTime($c)      => $body,
            AnyColumn::Period($c)         => $body,
            AnyColumn::Array($c)          => $body,
            AnyColumn::Marker($c)         => $body,
        }
    };
}

impl AnyColumn {
    pub fn as_long(&self) -> Option<&TypedRef<i64>> {
        match self { Self::Long(c) => Some(c), _ => None }
    }
    pub fn as_bool(&self) -> Option<&TypedRef<bool>> {
        match self { Self::Bool(c) => Some(c), _ => None }
    }
    pub fn as_str(&self) -> Option<&TypedRef<String>> {
        match self { Self::Str(c) => Some(c), _ => None }
    }
}

impl std::fmt::Debug for AnyColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnyColumn({})", self.ctype())
    }
}

impl Defined for AnyColumn {
    fn is_defined_at(&self, row: RowId) -> bool { dispatch!(self, c => c.is_defined_at(row)) }
}

impl Column for AnyColumn {
    fn ctype(&self) -> CType { dispatch!(self, c => c.ctype()) }
    fn cvalue(&self, row: RowId) -> CValue { dispatch!(self, c => c.cvalue(row)) }
    fn json_value(&self, row: RowId) -> JsonValue { dispatch!(self, c => c.json_value(row)) }
    fn str_value(&self, row: RowId) -> String { dispatch!(self, c => c.str_value(row)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_path_reports_undefined_rows() {
        let col = ArrayColumn::from_options(CType::Long, vec![Some(1i64), None]);
        assert_eq!(col.checked_value(0).unwrap(), 1);
        assert!(matches!(col.checked_value(1), Err(ColumnError::NotDefined { row: 1 })));
        assert!(matches!(col.checked_cvalue(-3), Err(ColumnError::NotDefined { row: -3 })));
    }

    #[test]
    fn any_column_delegates_to_inner() {
        let any = AnyColumn::Long(Arc::new(ArrayColumn::from_options(
            CType::Long,
            vec![None, Some(7i64)],
        )));
        assert_eq!(any.ctype(), CType::Long);
        assert!(!any.is_defined_at(0));
        assert_eq!(any.cvalue(1), CValue::Long(7));
        assert_eq!(any.str_value(1), "7");
        assert_eq!(any.json_value(1), serde_json::json!(7));
        assert!(any.as_long().is_some());
        assert!(any.as_bool().is_none());
    }
}
