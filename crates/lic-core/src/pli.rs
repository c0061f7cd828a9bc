//! 零件表（Parts List Inventory）
//!
//! 每个 [`PliItem`] 对应一种（文件名, 颜色）组合，`quantity` 始终等于
//! `part_numbers.len()`，并且与一个 [`PliQty`] 数量标签一一对应。

use crate::item::{node_common, ItemId, ItemType, Lookup, Node};
use crate::math::Rect;
use crate::model::Part;
use serde::{Deserialize, Serialize};

/// 步骤的零件表面板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pli {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub pli_items: Vec<ItemId>,
    pub bounds: Option<Rect>,
}

impl Pli {
    pub fn new(step: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(step),
            pli_items: Vec::new(),
            bounds: None,
        }
    }
}

impl Node for Pli {
    node_common!(ItemType::Pli);

    fn child_list(&self, child: ItemType) -> Option<&Vec<ItemId>> {
        (child == ItemType::PliItem).then_some(&self.pli_items)
    }

    fn child_list_mut(&mut self, child: ItemType) -> Option<&mut Vec<ItemId>> {
        (child == ItemType::PliItem).then_some(&mut self.pli_items)
    }
}

/// 零件表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PliItem {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub filename: String,
    pub color_code: i32,
    /// 属于本项的零件下标
    pub part_numbers: Vec<usize>,
    pub quantity: u32,
    /// 数量标签（PLIQty）
    pub quantity_label: Option<ItemId>,
    pub bounds: Option<Rect>,
}

impl PliItem {
    /// 以单个零件创建
    pub fn new(pli: Lookup, part: &Part, part_id: usize) -> Self {
        Self {
            id: 0,
            parent: Some(pli),
            filename: part.filename.clone(),
            color_code: part.color_code,
            part_numbers: vec![part_id],
            quantity: 1,
            quantity_label: None,
            bounds: None,
        }
    }

    /// 是否与指定零件的文件名和颜色一致
    pub fn matches(&self, filename: &str, color_code: i32) -> bool {
        self.filename == filename && self.color_code == color_code
    }

    /// 用于测量图标的零件描述
    pub fn part(&self) -> Part {
        Part::new(self.filename.clone(), self.color_code)
    }

    pub fn add_part(&mut self, part_id: usize) {
        self.part_numbers.push(part_id);
        self.quantity = self.part_numbers.len() as u32;
    }

    pub fn remove_part(&mut self, part_id: usize) -> bool {
        let Some(idx) = self.part_numbers.iter().position(|&p| p == part_id) else {
            return false;
        };
        self.part_numbers.remove(idx);
        self.quantity = self.part_numbers.len() as u32;
        true
    }
}

impl Node for PliItem {
    node_common!(ItemType::PliItem);

    fn child_slot(&self, child: ItemType) -> Option<ItemId> {
        match child {
            ItemType::PliQty => self.quantity_label,
            _ => None,
        }
    }

    fn set_child_slot(&mut self, child: ItemType, id: Option<ItemId>) -> bool {
        match child {
            ItemType::PliQty => {
                self.quantity_label = id;
                true
            }
            _ => false,
        }
    }
}

/// 零件表项的 "×N" 数量标签，文本由父项的 `quantity` 推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PliQty {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl PliQty {
    pub fn new(pli_item: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(pli_item),
            bounds: None,
        }
    }
}

impl Node for PliQty {
    node_common!(ItemType::PliQty);
}

/// 数量标签文本
pub fn quantity_text(quantity: u32) -> String {
    format!("x{quantity}")
}
