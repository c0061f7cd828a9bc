//! Lic 说明书文档核心
//!
//! 维护由模型生成的积木说明书的页面结构：页面、步骤、零件表、标注等条目，
//! 以及它们之间的父子关系、导航、结构变更和页面布局。
//!
//! # 架构设计
//!
//! - [`State`]: 条目注册表，按类型分表存储，条目之间以 [`Lookup`] 相互引用
//! - [`Document`]: 状态 + 模型提供者 + 尺寸提供者 + 布局配置，所有操作的入口
//! - [`ModelProvider`] / [`SizeProvider`]: 模型数据与尺寸测量的外部接口
//!
//! # 示例
//!
//! ```rust
//! use lic_core::prelude::*;
//!
//! let model = ModelFile::new(
//!     Model::new("house.ldr")
//!         .with_parts([Part::new("3001.dat", 4), Part::new("3001.dat", 4)])
//!         .with_steps([vec![0], vec![1]]),
//! );
//! let mut doc = Document::new(model, EstimatingSizeProvider::default());
//! doc.import_model(&ImportOptions::default()).unwrap();
//!
//! assert_eq!(doc.state().page_count(false), 2);
//! ```

pub mod annotation;
pub mod config;
pub mod decoration;
pub mod document;
pub mod error;
pub mod generate;
pub mod item;
pub mod label;
pub mod layout;
pub mod math;
pub mod model;
pub mod mutation;
pub mod navigation;
pub mod page;
pub mod pli;
pub mod render;
pub mod state;
pub mod step;

pub use document::Document;
pub use error::RegistryError;
pub use item::{ItemId, ItemType, Lookup, Node};
pub use model::ModelProvider;
pub use render::SizeProvider;
pub use state::State;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::annotation::{
        AddAnnotationOptions, Annotation, AnnotationType, SetAnnotationOptions,
    };
    pub use crate::config::{ImportOptions, LayoutConfig};
    pub use crate::decoration::{
        AddPartToCalloutOptions, Callout, Divider, RemovePartFromCalloutOptions, RotateIcon,
        SubmodelImage,
    };
    pub use crate::document::Document;
    pub use crate::error::RegistryError;
    pub use crate::item::{ItemId, ItemType, Lookup, Node};
    pub use crate::math::{Point2, Rect, Size, Vector2};
    pub use crate::model::{Model, ModelFile, ModelProvider, Part};
    pub use crate::mutation::{
        AddStepOptions, DisplacePartOptions, MergeStepsOptions, MovePartOptions, MoveStepOptions,
        ReparentOptions, RepositionOptions,
    };
    pub use crate::page::{Page, PageKind};
    pub use crate::pli::{Pli, PliItem, PliQty};
    pub use crate::render::{EstimatingSizeProvider, SizeProvider};
    pub use crate::state::State;
    pub use crate::step::{Csi, Direction, Step};
}
