//! 步骤与步骤图（CSI）

use crate::item::{node_common, ItemId, ItemType, Lookup, Node};
use crate::math::Rect;
use serde::{Deserialize, Serialize};

/// 零件位移方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
}

/// 步骤图中被移开显示的零件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacedPart {
    pub part_id: usize,
    pub direction: Direction,
    /// 零件移开的距离
    pub part_distance: f64,
    /// 箭头起点偏移
    pub arrow_offset: f64,
    pub arrow_length: f64,
    /// 箭头旋转角度（度）
    pub arrow_rotation: f64,
}

/// 搭建步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: ItemId,

    /// 所属页面或插图框（Callout）
    pub parent: Option<Lookup>,

    /// 步骤号；封面页的步骤没有编号
    pub number: Option<u32>,

    pub number_label: Option<ItemId>,

    /// 本步骤加入的零件（所在子模型中的零件下标），升序
    pub parts: Vec<usize>,

    /// 子模型路径：从主模型开始逐级的零件下标
    pub submodel: Vec<usize>,

    pub csi_id: Option<ItemId>,

    pub pli_id: Option<ItemId>,

    pub callouts: Vec<ItemId>,

    pub annotations: Vec<ItemId>,

    pub submodel_image_id: Option<ItemId>,

    pub rotate_icon_id: Option<ItemId>,

    pub displaced_parts: Vec<DisplacedPart>,

    pub bounds: Option<Rect>,
}

impl Step {
    /// 创建空步骤
    pub fn new(parent: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(parent),
            number: None,
            number_label: None,
            parts: Vec::new(),
            submodel: Vec::new(),
            csi_id: None,
            pli_id: None,
            callouts: Vec::new(),
            annotations: Vec::new(),
            submodel_image_id: None,
            rotate_icon_id: None,
            displaced_parts: Vec::new(),
            bounds: None,
        }
    }

    /// 设置零件及子模型路径
    pub fn with_parts(mut self, parts: Vec<usize>, submodel: &[usize]) -> Self {
        self.parts = parts;
        self.submodel = submodel.to_vec();
        self
    }

    /// 加入一个零件并保持升序
    pub fn add_part(&mut self, part_id: usize) {
        self.parts.push(part_id);
        self.parts.sort_unstable();
    }

    /// 移除一个零件，不存在时返回 `false`
    pub fn remove_part(&mut self, part_id: usize) -> bool {
        match self.parts.iter().position(|&p| p == part_id) {
            Some(idx) => {
                self.parts.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl Node for Step {
    node_common!(ItemType::Step);

    fn number(&self) -> Option<u32> {
        self.number
    }

    fn set_number(&mut self, number: Option<u32>) {
        self.number = number;
    }

    fn child_list(&self, child: ItemType) -> Option<&Vec<ItemId>> {
        match child {
            ItemType::Callout => Some(&self.callouts),
            ItemType::Annotation => Some(&self.annotations),
            _ => None,
        }
    }

    fn child_list_mut(&mut self, child: ItemType) -> Option<&mut Vec<ItemId>> {
        match child {
            ItemType::Callout => Some(&mut self.callouts),
            ItemType::Annotation => Some(&mut self.annotations),
            _ => None,
        }
    }

    fn child_slot(&self, child: ItemType) -> Option<ItemId> {
        match child {
            ItemType::Csi => self.csi_id,
            ItemType::Pli => self.pli_id,
            ItemType::NumberLabel => self.number_label,
            ItemType::SubmodelImage => self.submodel_image_id,
            ItemType::RotateIcon => self.rotate_icon_id,
            _ => None,
        }
    }

    fn set_child_slot(&mut self, child: ItemType, id: Option<ItemId>) -> bool {
        let slot = match child {
            ItemType::Csi => &mut self.csi_id,
            ItemType::Pli => &mut self.pli_id,
            ItemType::NumberLabel => &mut self.number_label,
            ItemType::SubmodelImage => &mut self.submodel_image_id,
            ItemType::RotateIcon => &mut self.rotate_icon_id,
            _ => return false,
        };
        *slot = id;
        true
    }
}

/// 步骤图（Construction Step Image）
///
/// 尺寸由渲染器给出，位置相对所属步骤居中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Csi {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl Csi {
    pub fn new(step: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(step),
            bounds: None,
        }
    }
}

impl Node for Csi {
    node_common!(ItemType::Csi);
}
