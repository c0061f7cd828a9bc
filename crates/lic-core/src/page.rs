//! 页面条目
//!
//! 普通页、封面页、清单页与模板页共用同一结构，以 [`PageKind`] 区分。
//! 页面是根条目，没有父条目；几何尺寸由文档的 `page_size` 决定。

use crate::item::{ItemId, ItemType, Lookup, Node};
use serde::{Deserialize, Serialize};

/// 页面种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PageKind {
    /// 普通步骤页
    #[default]
    Basic,
    /// 封面页（单例）
    Title,
    /// 零件清单页
    Inventory,
    /// 模板页（单例）
    Template,
}

impl PageKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            PageKind::Basic => ItemType::Page,
            PageKind::Title => ItemType::TitlePage,
            PageKind::Inventory => ItemType::InventoryPage,
            PageKind::Template => ItemType::TemplatePage,
        }
    }

    pub fn from_item_type(item_type: ItemType) -> Option<Self> {
        match item_type {
            ItemType::Page => Some(PageKind::Basic),
            ItemType::TitlePage => Some(PageKind::Title),
            ItemType::InventoryPage => Some(PageKind::Inventory),
            ItemType::TemplatePage => Some(PageKind::Template),
            _ => None,
        }
    }
}

/// 页面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: ItemId,

    pub kind: PageKind,

    /// 页码
    pub number: Option<u32>,

    /// 页码标签（NumberLabel）
    pub number_label: Option<ItemId>,

    /// 页面上的步骤，按显示顺序排列
    pub steps: Vec<ItemId>,

    /// 文本标签（封面页的标题与模型信息）
    pub labels: Vec<ItemId>,

    pub annotations: Vec<ItemId>,

    pub dividers: Vec<ItemId>,

    /// 结构变化后等待重新布局
    pub needs_layout: bool,
}

impl Page {
    /// 创建新页面
    pub fn new(kind: PageKind) -> Self {
        Self {
            id: 0,
            kind,
            number: None,
            number_label: None,
            steps: Vec::new(),
            labels: Vec::new(),
            annotations: Vec::new(),
            dividers: Vec::new(),
            needs_layout: true,
        }
    }

    pub fn is_title_page(&self) -> bool {
        self.kind == PageKind::Title
    }
}

impl Node for Page {
    fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn parent(&self) -> Option<Lookup> {
        None
    }

    fn set_parent(&mut self, _parent: Option<Lookup>) {}

    fn number(&self) -> Option<u32> {
        self.number
    }

    fn set_number(&mut self, number: Option<u32>) {
        self.number = number;
    }

    fn child_list(&self, child: ItemType) -> Option<&Vec<ItemId>> {
        match child {
            ItemType::Step => Some(&self.steps),
            ItemType::Label => Some(&self.labels),
            ItemType::Annotation => Some(&self.annotations),
            ItemType::Divider => Some(&self.dividers),
            _ => None,
        }
    }

    fn child_list_mut(&mut self, child: ItemType) -> Option<&mut Vec<ItemId>> {
        match child {
            ItemType::Step => Some(&mut self.steps),
            ItemType::Label => Some(&mut self.labels),
            ItemType::Annotation => Some(&mut self.annotations),
            ItemType::Divider => Some(&mut self.dividers),
            _ => None,
        }
    }

    fn child_slot(&self, child: ItemType) -> Option<ItemId> {
        match child {
            ItemType::NumberLabel => self.number_label,
            _ => None,
        }
    }

    fn set_child_slot(&mut self, child: ItemType, id: Option<ItemId>) -> bool {
        match child {
            ItemType::NumberLabel => {
                self.number_label = id;
                true
            }
            _ => false,
        }
    }
}
