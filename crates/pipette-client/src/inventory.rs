//! 吸头库存
//!
//! 有序吸头位置上的双向游标。游标取值范围 `[0, len]`：
//! `advance()` 返回游标处的吸头并前移，`retreat()` 后移并返回该处吸头。

use crate::labware::Location;
use thiserror::Error;
use tracing::debug;

/// 游标越界
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Tip inventory exhausted")]
pub struct InventoryExhausted;

/// 吸头库存
#[derive(Debug, Clone, PartialEq)]
pub struct TipInventory<T = Location> {
    slots: Vec<T>,
    cursor: usize,
}

impl<T> TipInventory<T> {
    pub fn new(slots: Vec<T>) -> Self {
        Self { slots, cursor: 0 }
    }

    /// 取出游标处的吸头并前移
    pub fn advance(&mut self) -> Result<&T, InventoryExhausted> {
        let slot = self.slots.get(self.cursor).ok_or(InventoryExhausted)?;
        self.cursor += 1;
        debug!("Tip inventory advanced to {}/{}", self.cursor, self.slots.len());
        Ok(slot)
    }

    /// 游标后移并返回该处吸头（即上一次 `advance` 返回的吸头）
    pub fn retreat(&mut self) -> Result<&T, InventoryExhausted> {
        if self.cursor == 0 {
            return Err(InventoryExhausted);
        }
        self.cursor -= 1;
        debug!("Tip inventory retreated to {}/{}", self.cursor, self.slots.len());
        Ok(&self.slots[self.cursor])
    }

    /// 游标处的吸头（不移动游标）
    pub fn peek(&self) -> Option<&T> {
        self.slots.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 尚未发出的吸头数
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.cursor
    }
}

/// 吸头架
///
/// 吸头位置按拾取顺序排列；`tip_length - tip_overlap` 为装上吸头后
/// 工具有效原点需要下移的距离。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TipRack {
    pub slots: Vec<Location>,
    pub tip_length: f64,
    pub tip_overlap: f64,
}

impl TipRack {
    pub fn new(slots: Vec<Location>, tip_length: f64, tip_overlap: f64) -> Self {
        Self {
            slots,
            tip_length,
            tip_overlap,
        }
    }

    /// z 偏移补偿量
    pub fn tip_offset(&self) -> f64 {
        self.tip_length - self.tip_overlap
    }
}
