//! 全局基础类型与错误定义

use thiserror::Error;

use crate::field_type::CType;

// ── 行号 ──────────────────────────────────────────────────────────────────────

/// 行号。负数永远视为"未定义"，而不是错误。
pub type RowId = i64;

// ── GroupId ───────────────────────────────────────────────────────────────────

/// 分组（分区）标识，仅有身份语义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

impl GroupId {
    pub fn new(id: u64) -> Self { Self(id) }
    pub fn get(self) -> u64 { self.0 }
}

impl From<u64> for GroupId {
    fn from(id: u64) -> Self { Self(id) }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("column is not defined at row {row}")]
    NotDefined { row: RowId },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: CType, found: CType },
    #[error("invalid segments: {0}")]
    InvalidSegments(String),
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: i64, size: usize },
    #[error("length mismatch: {values} values vs {defined} presence bits")]
    LengthMismatch { values: usize, defined: usize },
    #[error("scan ranges out of order: {0}")]
    ScanOrder(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("header I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ColumnError>;

// ── 前置条件违例 ──────────────────────────────────────────────────────────────

/// 在未定义的行上读取值：直接中止，绝不返回默认值
#[cold]
#[track_caller]
pub(crate) fn undefined_access(ctype: &CType, row: RowId) -> ! {
    panic!("value read from {ctype} column at row {row}, which is not defined")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_displays_as_integer() {
        let g: GroupId = 42u64.into();
        assert_eq!(g.to_string(), "42");
        assert_eq!(g, GroupId::new(42));
        assert_eq!(g.get(), 42);
    }

    #[test]
    fn error_messages_carry_context() {
        let e = ColumnError::TypeMismatch { expected: CType::Long, found: CType::Str };
        assert_eq!(e.to_string(), "type mismatch: expected Long, found Str");
        assert_eq!(
            ColumnError::NotDefined { row: -1 }.to_string(),
            "column is not defined at row -1"
        );
    }
}
