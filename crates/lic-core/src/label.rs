//! 文本标签

use crate::item::{node_common, ItemId, ItemType, Lookup, Node};
use crate::math::Rect;
use serde::{Deserialize, Serialize};

/// 自由文本标签（封面页标题、模型信息）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub text: String,
    /// CSS 风格字体描述，如 `20pt Helvetica`
    pub font: String,
    pub color: String,
    pub bounds: Option<Rect>,
}

impl Label {
    pub fn new(parent: Lookup, text: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            id: 0,
            parent: Some(parent),
            text: text.into(),
            font: font.into(),
            color: "black".to_string(),
            bounds: None,
        }
    }
}

impl Node for Label {
    node_common!(ItemType::Label);
}

/// 页码或步骤号标签，文本由父条目的 `number` 推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLabel {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl NumberLabel {
    pub fn new(parent: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(parent),
            bounds: None,
        }
    }
}

impl Node for NumberLabel {
    node_common!(ItemType::NumberLabel);
}

/// 子模型图的数量标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityLabel {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl QuantityLabel {
    pub fn new(parent: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(parent),
            bounds: None,
        }
    }
}

impl Node for QuantityLabel {
    node_common!(ItemType::QuantityLabel);
}
