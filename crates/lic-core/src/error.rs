//! 注册表错误定义

use crate::item::{ItemType, Lookup};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Item type has no list: {0}")]
    InvalidType(ItemType),

    #[error("Item not found: {0}")]
    NotFound(Lookup),

    #[error("{child} cannot be a child of {parent}")]
    InvalidParent { child: ItemType, parent: Lookup },
}
