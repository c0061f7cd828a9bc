//! 模型导入
//!
//! 模型以 JSON 描述：完整的 `{ main, submodels }`，或只有一个模型。

use crate::error::FileError;
use lic_core::model::{Model, ModelFile};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelDescription {
    File(ModelFile),
    Single(Model),
}

/// 从文件导入模型
pub fn import_model(path: &Path) -> Result<ModelFile, FileError> {
    let text = fs::read_to_string(path)?;
    let model = parse_model(&text)?;
    info!(
        "Imported {} ({} parts, {} submodels)",
        model.main.filename,
        model.main.parts.len(),
        model.submodels.len()
    );
    Ok(model)
}

/// 解析模型描述并校验步骤引用的零件下标
pub fn parse_model(text: &str) -> Result<ModelFile, FileError> {
    let description: ModelDescription = serde_json::from_str(text)?;
    let model = match description {
        ModelDescription::File(file) => file,
        ModelDescription::Single(model) => ModelFile::new(model),
    };
    if model.main.filename.is_empty() {
        return Err(FileError::MissingModel("main model has no filename".to_string()));
    }

    for m in std::iter::once(&model.main).chain(model.submodels.values()) {
        validate(m)?;
    }
    for (filename, sub) in &model.submodels {
        if filename != &sub.filename {
            warn!("Submodel {} is registered as {}", sub.filename, filename);
        }
    }
    Ok(model)
}

fn validate(model: &Model) -> Result<(), FileError> {
    let Some(steps) = &model.steps else {
        return Ok(());
    };
    for (idx, step) in steps.iter().enumerate() {
        if let Some(&part) = step.parts.iter().find(|&&p| p >= model.parts.len()) {
            return Err(FileError::InvalidFormat(format!(
                "Step {} of {} references part {} but the model has {} parts",
                idx,
                model.filename,
                part,
                model.parts.len()
            )));
        }
    }
    Ok(())
}
