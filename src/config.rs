//! 切片尺寸策略配置
//!
//! 本层只承载这四个参数，不解释它们；由上层切片逻辑消费。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{ColumnError, Result};

/// 笛卡尔积"合理"基数上限
pub const DEFAULT_MAX_SANE_CROSS_SIZE: u64 = 2_400_000_000;
pub const DEFAULT_MAX_SLICE_SIZE:      usize = 20_000;
pub const DEFAULT_SMALL_SLICE_SIZE:    usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnarTableModuleConfig {
    pub max_slice_size:       usize,
    /// 默认为 max_slice_size / 4
    pub min_ideal_slice_size: usize,
    pub small_slice_size:     usize,
    pub max_sane_cross_size:  u64,
}

impl ColumnarTableModuleConfig {
    pub fn new(max_slice_size: usize, small_slice_size: usize) -> Self {
        Self {
            max_slice_size,
            min_ideal_slice_size: max_slice_size / 4,
            small_slice_size,
            max_sane_cross_size: DEFAULT_MAX_SANE_CROSS_SIZE,
        }
    }

    pub fn with_min_ideal_slice_size(mut self, size: usize) -> Self {
        self.min_ideal_slice_size = size; self
    }
    pub fn with_small_slice_size(mut self, size: usize) -> Self {
        self.small_slice_size = size; self
    }
    pub fn with_max_sane_cross_size(mut self, size: u64) -> Self {
        self.max_sane_cross_size = size; self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_slice_size == 0 {
            return Err(ColumnError::InvalidConfig("max_slice_size must be positive".into()));
        }
        if self.min_ideal_slice_size > self.max_slice_size {
            return Err(ColumnError::InvalidConfig(format!(
                "min_ideal_slice_size {} exceeds max_slice_size {}",
                self.min_ideal_slice_size, self.max_slice_size
            )));
        }
        if self.small_slice_size > self.max_slice_size {
            return Err(ColumnError::InvalidConfig(format!(
                "small_slice_size {} exceeds max_slice_size {}",
                self.small_slice_size, self.max_slice_size
            )));
        }
        Ok(())
    }

    /// 从 JSON 解析；省略的字段取默认值，`min_ideal_slice_size` 缺省时按
    /// `max_slice_size / 4` 推导
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let max = raw.max_slice_size.unwrap_or(DEFAULT_MAX_SLICE_SIZE);
        let config = Self {
            max_slice_size:       max,
            min_ideal_slice_size: raw.min_ideal_slice_size.unwrap_or(max / 4),
            small_slice_size:     raw.small_slice_size.unwrap_or(DEFAULT_SMALL_SLICE_SIZE),
            max_sane_cross_size:  raw.max_sane_cross_size.unwrap_or(DEFAULT_MAX_SANE_CROSS_SIZE),
        };
        config.validate()?;
        debug!(?config, "columnar table module config loaded");
        Ok(config)
    }

    /// 序列化为 JSON；结果可由 `from_json` 原样读回
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for ColumnarTableModuleConfig {
    fn default() -> Self { Self::new(DEFAULT_MAX_SLICE_SIZE, DEFAULT_SMALL_SLICE_SIZE) }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    max_slice_size:       Option<usize>,
    min_ideal_slice_size: Option<usize>,
    small_slice_size:     Option<usize>,
    max_sane_cross_size:  Option<u64>,
}
