//! 列的标量类型标签与运行时值

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

/// 列类型标签（封闭集合）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CType {
    Bool,
    Long,
    Double,
    /// 任意精度十进制
    Num,
    Str,
    /// UTC 时间点
    Date,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Period,
    /// 同构数组，参数为元素类型
    HomogeneousArray(Box<CType>),
    // 以下为零信息标记类型：只有定义性，没有值
    Null,
    EmptyObject,
    EmptyArray,
    Undefined,
}

impl CType {
    pub fn array_of(elem: CType) -> Self { Self::HomogeneousArray(Box::new(elem)) }

    /// 零信息标记类型（Null / EmptyObject / EmptyArray / Undefined）
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Null | Self::EmptyObject | Self::EmptyArray | Self::Undefined)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::OffsetDateTime | Self::LocalDateTime
                | Self::LocalDate | Self::LocalTime | Self::Period
        )
    }
}

impl std::fmt::Display for CType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool                => write!(f, "Bool"),
            Self::Long                => write!(f, "Long"),
            Self::Double              => write!(f, "Double"),
            Self::Num                 => write!(f, "Num"),
            Self::Str                 => write!(f, "Str"),
            Self::Date                => write!(f, "Date"),
            Self::OffsetDateTime      => write!(f, "OffsetDateTime"),
            Self::LocalDateTime       => write!(f, "LocalDateTime"),
            Self::LocalDate           => write!(f, "LocalDate"),
            Self::LocalTime           => write!(f, "LocalTime"),
            Self::Period              => write!(f, "Period"),
            Self::HomogeneousArray(e) => write!(f, "Array[{e}]"),
            Self::Null                => write!(f, "Null"),
            Self::EmptyObject         => write!(f, "EmptyObject"),
            Self::EmptyArray          => write!(f, "EmptyArray"),
            Self::Undefined           => write!(f, "Undefined"),
        }
    }
}

// ── Period ────────────────────────────────────────────────────────────────────

/// 日历时长：月、天与纳秒分量彼此独立，不做归一化
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    pub months: i32,
    pub days:   i32,
    pub nanos:  i64,
}

impl Period {
    pub fn new(months: i32, days: i32, nanos: i64) -> Self { Self { months, days, nanos } }
    pub fn months(months: i32) -> Self { Self::new(months, 0, 0) }
    pub fn days(days: i32) -> Self { Self::new(0, days, 0) }
    /// 纳秒溢出 i64（约 ±292 年）时返回 `None`
    pub fn seconds(secs: i64) -> Option<Self> {
        secs.checked_mul(1_000_000_000).map(|nanos| Self::new(0, 0, nanos))
    }
    pub fn is_zero(&self) -> bool { self.months == 0 && self.days == 0 && self.nanos == 0 }
}

/// ISO-8601 形式，例如 `P1M2DT3.5S`
impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }
        write!(f, "P")?;
        if self.months != 0 { write!(f, "{}M", self.months)?; }
        if self.days   != 0 { write!(f, "{}D", self.days)?; }
        if self.nanos  != 0 {
            let sign = if self.nanos < 0 { "-" } else { "" };
            let abs  = self.nanos.unsigned_abs();
            let secs = abs / 1_000_000_000;
            let frac = abs % 1_000_000_000;
            if frac == 0 {
                write!(f, "T{sign}{secs}S")?;
            } else {
                let digits = format!("{frac:09}");
                write!(f, "T{sign}{secs}.{}S", digits.trim_end_matches('0'))?;
            }
        }
        Ok(())
    }
}

// ── CValue ────────────────────────────────────────────────────────────────────

/// 规范值（canonical value）：与 CType 一一对应，Undefined 没有值
#[derive(Debug, Clone, PartialEq)]
pub enum CValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Num(BigDecimal),
    Str(String),
    Date(DateTime<Utc>),
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    Period(Period),
    Array(Vec<CValue>),
    Null,
    EmptyObject,
    EmptyArray,
}

impl CValue {
    pub fn as_long(&self) -> Option<i64> {
        match self { Self::Long(v) => Some(*v), _ => None }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self { Self::Bool(v) => Some(*v), _ => None }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self { Self::Str(s) => Some(s), _ => None }
    }

    /// 转为通用 JSON 值。
    /// 十进制数以字符串输出以保留精度；非有限的 double 同样输出为字符串。
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b)           => JsonValue::Bool(*b),
            Self::Long(v)           => JsonValue::from(*v),
            Self::Double(v)         => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            Self::Num(d)            => JsonValue::String(d.to_string()),
            Self::Str(s)            => JsonValue::String(s.clone()),
            Self::Date(d)           => JsonValue::String(d.to_rfc3339()),
            Self::OffsetDateTime(d) => JsonValue::String(d.to_rfc3339()),
            Self::LocalDateTime(d)  => JsonValue::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::LocalDate(d)      => JsonValue::String(d.to_string()),
            Self::LocalTime(t)      => JsonValue::String(t.to_string()),
            Self::Period(p)         => JsonValue::String(p.to_string()),
            Self::Array(items)      => JsonValue::Array(items.iter().map(CValue::to_json).collect()),
            Self::Null              => JsonValue::Null,
            Self::EmptyObject       => JsonValue::Object(serde_json::Map::new()),
            Self::EmptyArray        => JsonValue::Array(Vec::new()),
        }
    }
}

impl std::fmt::Display for CValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b)           => write!(f, "{b}"),
            Self::Long(v)           => write!(f, "{v}"),
            Self::Double(v)         => write!(f, "{v}"),
            Self::Num(d)            => write!(f, "{d}"),
            Self::Str(s)            => write!(f, "{s}"),
            Self::Date(d)           => write!(f, "{}", d.to_rfc3339()),
            Self::OffsetDateTime(d) => write!(f, "{}", d.to_rfc3339()),
            Self::LocalDateTime(d)  => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::LocalDate(d)      => write!(f, "{d}"),
            Self::LocalTime(t)      => write!(f, "{t}"),
            Self::Period(p)         => write!(f, "{p}"),
            Self::Array(items)      => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, ",")?; }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Null              => write!(f, "null"),
            Self::EmptyObject       => write!(f, "{{}}"),
            Self::EmptyArray        => write!(f, "[]"),
        }
    }
}

// ── ColumnValue ───────────────────────────────────────────────────────────────

/// 可以作为列值的 Rust 类型
pub trait ColumnValue: Clone + Send + Sync + 'static {
    fn into_cvalue(self) -> CValue;
}

impl ColumnValue for bool {
    fn into_cvalue(self) -> CValue { CValue::Bool(self) }
}
impl ColumnValue for i64 {
    fn into_cvalue(self) -> CValue { CValue::Long(self) }
}
impl ColumnValue for f64 {
    fn into_cvalue(self) -> CValue { CValue::Double(self) }
}
impl ColumnValue for BigDecimal {
    fn into_cvalue(self) -> CValue { CValue::Num(self) }
}
impl ColumnValue for String {
    fn into_cvalue(self) -> CValue { CValue::Str(self) }
}
impl ColumnValue for DateTime<Utc> {
    fn into_cvalue(self) -> CValue { CValue::Date(self) }
}
impl ColumnValue for DateTime<FixedOffset> {
    fn into_cvalue(self) -> CValue { CValue::OffsetDateTime(self) }
}
impl ColumnValue for NaiveDateTime {
    fn into_cvalue(self) -> CValue { CValue::LocalDateTime(self) }
}
impl ColumnValue for NaiveDate {
    fn into_cvalue(self) -> CValue { CValue::LocalDate(self) }
}
impl ColumnValue for NaiveTime {
    fn into_cvalue(self) -> CValue { CValue::LocalTime(self) }
}
impl ColumnValue for Period {
    fn into_cvalue(self) -> CValue { CValue::Period(self) }
}
/// 同构数组：元素类型由列的 CType 给出
impl ColumnValue for Vec<CValue> {
    fn into_cvalue(self) -> CValue { CValue::Array(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn period_iso_display() {
        assert_eq!(Period::default().to_string(), "PT0S");
        assert_eq!(Period::new(1, 2, 3_500_000_000).to_string(), "P1M2DT3.5S");
        assert_eq!(Period::days(7).to_string(), "P7D");
        assert_eq!(Period::new(0, 0, -2_000_000_000).to_string(), "PT-2S");
    }

    #[test]
    fn period_seconds_range() {
        assert_eq!(Period::seconds(90).map(|p| p.to_string()).as_deref(), Some("PT90S"));
        assert_eq!(Period::seconds(-9_223_372_036), Some(Period::new(0, 0, -9_223_372_036_000_000_000)));
        assert_eq!(Period::seconds(9_300_000_000), None);
        assert_eq!(Period::seconds(i64::MIN), None);
    }

    #[test]
    fn json_keeps_decimal_precision() {
        let d = BigDecimal::from_str("12345678901234567890.0000000001").unwrap();
        assert_eq!(
            CValue::Num(d).to_json(),
            JsonValue::String("12345678901234567890.0000000001".into())
        );
        assert_eq!(CValue::Double(f64::NAN).to_json(), JsonValue::String("NaN".into()));
        assert_eq!(CValue::EmptyObject.to_json(), serde_json::json!({}));
    }

    #[test]
    fn array_text_form() {
        let v = CValue::Array(vec![CValue::Long(1), CValue::Long(2)]);
        assert_eq!(v.to_string(), "[1,2]");
        assert_eq!(v.to_json(), serde_json::json!([1, 2]));
        assert_eq!(CType::array_of(CType::Long).to_string(), "Array[Long]");
    }

    #[test]
    fn marker_types() {
        assert!(CType::Null.is_marker());
        assert!(CType::Undefined.is_marker());
        assert!(!CType::Long.is_marker());
        assert!(CType::Period.is_temporal());
    }
}
