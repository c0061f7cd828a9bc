//! 文档条目（Item）基础定义
//!
//! 所有条目共享 `{type, id, parent}` 结构。条目之间只通过 [`Lookup`]
//! （类型 + ID）互相引用，从不持有直接引用，需要时再经注册表解析。
//!
//! # 条目层级
//!
//! ```text
//! Page / TitlePage / InventoryPage / TemplatePage   (根)
//! ├── NumberLabel（页码）
//! ├── Label / Annotation / Divider
//! └── Step
//!     ├── NumberLabel（步骤号）
//!     ├── CSI
//!     ├── PLI
//!     │   └── PLIItem
//!     │       └── PLIQty
//!     ├── Callout
//!     │   └── Step ...
//!     ├── Annotation
//!     │   └── Point
//!     ├── SubmodelImage
//!     │   └── QuantityLabel
//!     └── RotateIcon
//! ```

use crate::math::{Point2, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 条目ID，在同一类型内唯一
pub type ItemId = u32;

/// 条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    TemplatePage,
    TitlePage,
    Page,
    InventoryPage,
    Step,
    Csi,
    Pli,
    PliItem,
    PliQty,
    NumberLabel,
    QuantityLabel,
    Label,
    Annotation,
    Point,
    Callout,
    SubmodelImage,
    Divider,
    RotateIcon,
}

impl ItemType {
    /// 所有条目类型
    pub const ALL: [ItemType; 18] = [
        ItemType::TemplatePage,
        ItemType::TitlePage,
        ItemType::Page,
        ItemType::InventoryPage,
        ItemType::Step,
        ItemType::Csi,
        ItemType::Pli,
        ItemType::PliItem,
        ItemType::PliQty,
        ItemType::NumberLabel,
        ItemType::QuantityLabel,
        ItemType::Label,
        ItemType::Annotation,
        ItemType::Point,
        ItemType::Callout,
        ItemType::SubmodelImage,
        ItemType::Divider,
        ItemType::RotateIcon,
    ];

    /// 类型名称
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::TemplatePage => "templatePage",
            ItemType::TitlePage => "titlePage",
            ItemType::Page => "page",
            ItemType::InventoryPage => "inventoryPage",
            ItemType::Step => "step",
            ItemType::Csi => "csi",
            ItemType::Pli => "pli",
            ItemType::PliItem => "pliItem",
            ItemType::PliQty => "pliQty",
            ItemType::NumberLabel => "numberLabel",
            ItemType::QuantityLabel => "quantityLabel",
            ItemType::Label => "label",
            ItemType::Annotation => "annotation",
            ItemType::Point => "point",
            ItemType::Callout => "callout",
            ItemType::SubmodelImage => "submodelImage",
            ItemType::Divider => "divider",
            ItemType::RotateIcon => "rotateIcon",
        }
    }

    /// 是否为页面类型
    pub fn is_page(&self) -> bool {
        matches!(
            self,
            ItemType::TemplatePage | ItemType::TitlePage | ItemType::Page | ItemType::InventoryPage
        )
    }

    /// 是否为根级单例（没有对应的列表）
    pub fn is_singleton(&self) -> bool {
        matches!(self, ItemType::TemplatePage | ItemType::TitlePage)
    }

    /// 该类型可以拥有的子条目类型
    ///
    /// 级联删除按此顺序处理子条目。
    pub fn child_types(&self) -> &'static [ItemType] {
        match self {
            ItemType::TemplatePage
            | ItemType::TitlePage
            | ItemType::Page
            | ItemType::InventoryPage => &[
                ItemType::Step,
                ItemType::NumberLabel,
                ItemType::Label,
                ItemType::Annotation,
                ItemType::Divider,
            ],
            ItemType::Step => &[
                ItemType::Csi,
                ItemType::Pli,
                ItemType::NumberLabel,
                ItemType::Callout,
                ItemType::Annotation,
                ItemType::SubmodelImage,
                ItemType::RotateIcon,
            ],
            ItemType::Pli => &[ItemType::PliItem],
            ItemType::PliItem => &[ItemType::PliQty],
            ItemType::Annotation => &[ItemType::Point],
            ItemType::Callout => &[ItemType::Step],
            ItemType::SubmodelImage => &[ItemType::QuantityLabel],
            _ => &[],
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 条目引用（类型 + ID）
///
/// 非拥有引用，经注册表解析；解析失败返回 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lookup {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub id: ItemId,
}

impl Lookup {
    pub const fn new(item_type: ItemType, id: ItemId) -> Self {
        Self { item_type, id }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.item_type, self.id)
    }
}

impl<T: Node + ?Sized> From<&T> for Lookup {
    fn from(item: &T) -> Self {
        item.lookup()
    }
}

/// 所有条目共有的行为
///
/// 导航、坐标变换和级联删除只依赖这个对象安全的接口。
pub trait Node: fmt::Debug {
    fn item_type(&self) -> ItemType;

    fn id(&self) -> ItemId;

    fn set_id(&mut self, id: ItemId);

    /// 父条目引用，根条目为 `None`
    fn parent(&self) -> Option<Lookup>;

    fn set_parent(&mut self, parent: Option<Lookup>);

    /// 相对父条目的几何信息，尚未布局时为 `None`
    fn bounds(&self) -> Option<Rect> {
        None
    }

    fn set_bounds(&mut self, _bounds: Option<Rect>) {}

    /// 相对父条目的位置
    fn position(&self) -> Option<Point2> {
        self.bounds().map(|b| b.origin())
    }

    /// 移动到指定位置；尚无几何信息的条目得到零尺寸矩形
    fn set_position(&mut self, x: f64, y: f64) {
        let bounds = match self.bounds() {
            Some(b) => Rect::new(x, y, b.width, b.height),
            None => Rect::new(x, y, 0.0, 0.0),
        };
        self.set_bounds(Some(bounds));
    }

    fn number(&self) -> Option<u32> {
        None
    }

    fn set_number(&mut self, _number: Option<u32>) {}

    /// 指定类型的子条目ID列表（如 `page.steps`）
    fn child_list(&self, _child: ItemType) -> Option<&Vec<ItemId>> {
        None
    }

    fn child_list_mut(&mut self, _child: ItemType) -> Option<&mut Vec<ItemId>> {
        None
    }

    /// 单个子条目槽位（如 `step.csi_id`）
    fn child_slot(&self, _child: ItemType) -> Option<ItemId> {
        None
    }

    /// 设置单个子条目槽位，没有该槽位时返回 `false`
    fn set_child_slot(&mut self, _child: ItemType, _id: Option<ItemId>) -> bool {
        false
    }

    fn lookup(&self) -> Lookup {
        Lookup::new(self.item_type(), self.id())
    }
}

/// 为带有 `id`、`parent`、`bounds` 字段的条目实现 [`Node`] 的公共部分
macro_rules! node_common {
    ($item_type:expr) => {
        fn item_type(&self) -> $crate::item::ItemType {
            $item_type
        }

        fn id(&self) -> $crate::item::ItemId {
            self.id
        }

        fn set_id(&mut self, id: $crate::item::ItemId) {
            self.id = id;
        }

        fn parent(&self) -> Option<$crate::item::Lookup> {
            self.parent
        }

        fn set_parent(&mut self, parent: Option<$crate::item::Lookup>) {
            self.parent = parent;
        }

        fn bounds(&self) -> Option<$crate::math::Rect> {
            self.bounds
        }

        fn set_bounds(&mut self, bounds: Option<$crate::math::Rect>) {
            self.bounds = bounds;
        }
    };
}

pub(crate) use node_common;
