//! # olap-column-engine
//!
//! OLAP 查询引擎的列式数据表示层：一族可组合、惰性求值的"列"视图。
//! 每个列独立于值跟踪逐行的定义性（null / 缺失）。
//!
//! ## 整体架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │              查询算子（过滤 / join / 部分结果并集）             │
//! │                           │                                  │
//! │        ┌──────────────────┼───────────────────┐              │
//! │        ▼                  ▼                   ▼              │
//! │  definedness        remap / concat       array_set           │
//! │  Map1 Map2          Concat NConcat       merge() 按 CType     │
//! │  Union(Lots)        Remap RemapFilter    分派，首个定义者胜    │
//! │  Intersect(Lots)    RemapIndices                             │
//! │  AndLots OrLots     Sparsen                                  │
//! │        │                  │                   │              │
//! │        └──────────────────┼───────────────────┘              │
//! │                           ▼                                  │
//! │   column::leaf   ArrayColumn(值 + BitSet) ConstColumn         │
//! │                  MarkerColumn EmptyColumn UndefinedColumn     │
//! │                                                              │
//! │   column_indices（路径→槽位） config（切片策略） scanner（顺序折叠）│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! 所有组合子不可变、零拷贝；取值的前置条件是 `is_defined_at(row)`。

// ── 基础 ──────────────────────────────────────────────────────────────────────
pub mod common;
pub mod field_type;
pub mod bitset;

// ── 列接口与叶子列 ────────────────────────────────────────────────────────────
pub mod column;

// ── 组合子 ────────────────────────────────────────────────────────────────────
pub mod definedness;
pub mod remap;
pub mod array_set;

// ── 登记表 / 配置 / 扫描 ──────────────────────────────────────────────────────
pub mod column_indices;
pub mod config;
pub mod scanner;

pub use column::{AnyColumn, Column, Defined, TypedColumn, TypedRef};
pub use common::{ColumnError, GroupId, Result, RowId};
pub use field_type::{CType, CValue, Period};
