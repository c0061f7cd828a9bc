//! Lic 文件格式处理
//!
//! 支持：
//! - `.lic` 原生格式（JSON：模型 + 文档状态 + 元数据）
//! - JSON 模型描述导入

pub mod document;
pub mod error;
pub mod import;
pub mod native;

pub use document::{DocumentMetadata, LicContent};
pub use error::FileError;
