//! ColumnIndices：列路径 → 槽位的稳定登记表
//!
//! 两个视图：
//! - `paths`：排序后的完整序列，**保留重复**
//! - `positions`：路径 → 下标，重复路径取**最后一次**出现的位置
//!
//! 两者在有重复路径时并不一致，这是有意保留的行为。
//! 实例不可变；表头集合变化时新建实例。

use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use crate::common::Result;

/// 表头行终止符
pub const HEADER_TERMINATOR: &str = "\r\n";

#[derive(Debug, Clone, Default)]
pub struct ColumnIndices {
    paths:     Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndices {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        paths.sort();
        // collect 到 HashMap 时后插入的同名键覆盖先前的，因此重复路径取最后位置
        let positions: HashMap<String, usize> = paths.iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i))
            .collect();
        debug!(paths = paths.len(), distinct = positions.len(), "column indices built");
        Self { paths, positions }
    }

    pub fn paths(&self) -> &[String] { &self.paths }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool { self.positions.contains_key(path) }

    pub fn len(&self)      -> usize { self.paths.len() }
    pub fn is_empty(&self) -> bool  { self.paths.is_empty() }

    /// 表头行：逗号连接的路径 + CRLF；为空时输出空串
    pub fn header(&self) -> String {
        if self.paths.is_empty() {
            return String::new();
        }
        let mut line = self.paths.join(",");
        line.push_str(HEADER_TERMINATOR);
        line
    }

    /// 写出表头行，返回写入字节数
    pub fn write_header<W: Write>(&self, mut writer: W) -> Result<usize> {
        let line = self.header();
        writer.write_all(line.as_bytes())?;
        Ok(line.len())
    }
}

/// 只比较有序路径序列
impl PartialEq for ColumnIndices {
    fn eq(&self, other: &Self) -> bool { self.paths == other.paths }
}

impl Eq for ColumnIndices {}

impl std::fmt::Display for ColumnIndices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}
