//! Lic原生文件格式（.lic）
//!
//! 单个 JSON 文档，包含格式版本、元数据、模型与完整的文档状态。

use crate::document::{DocumentMetadata, LicContent, FORMAT_VERSION};
use crate::error::FileError;
use lic_core::model::ModelFile;
use lic_core::render::SizeProvider;
use lic_core::{Document, State};
use std::fs;
use std::path::Path;
use tracing::info;

/// 保存到文件
pub fn save(
    path: &Path,
    metadata: &DocumentMetadata,
    model: &ModelFile,
    state: &State,
) -> Result<(), FileError> {
    let content = LicContent::new(metadata.clone(), model.clone(), state.clone());
    write_content(path, &content)
}

/// 保存文档并更新元数据的修改时间
pub fn save_document<R: SizeProvider>(
    path: &Path,
    document: &Document<ModelFile, R>,
    metadata: &mut DocumentMetadata,
) -> Result<(), FileError> {
    metadata.touch();
    let content = LicContent::from_document(document, metadata.clone());
    write_content(path, &content)
}

fn write_content(path: &Path, content: &LicContent) -> Result<(), FileError> {
    let json = serde_json::to_string_pretty(content)?;
    fs::write(path, json)?;
    info!(
        "Saved {} ({} pages, {} steps)",
        path.display(),
        content.state.page_count(true),
        content.state.steps.len()
    );
    Ok(())
}

/// 从文件加载
///
/// 先检查格式版本，比当前版本新的文件直接拒绝。
pub fn load(path: &Path) -> Result<LicContent, FileError> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    let version = value
        .get("format_version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| FileError::InvalidFormat("Missing format version".to_string()))?;
    if version > u64::from(FORMAT_VERSION) {
        return Err(FileError::UnsupportedVersion(format!(
            "File version {} is newer than supported version {}",
            version, FORMAT_VERSION
        )));
    }

    if matches!(value.get("model"), None | Some(serde_json::Value::Null)) {
        return Err(FileError::MissingModel(path.display().to_string()));
    }

    let content: LicContent = serde_json::from_value(value)?;
    info!("Loaded {} ({} pages)", path.display(), content.state.page_count(true));
    Ok(content)
}

/// 加载并还原为文档
pub fn open<R: SizeProvider>(
    path: &Path,
    renderer: R,
) -> Result<(DocumentMetadata, Document<ModelFile, R>), FileError> {
    Ok(load(path)?.into_document(renderer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lic_core::config::ImportOptions;
    use lic_core::model::{Model, Part};
    use lic_core::render::EstimatingSizeProvider;

    fn sample_document() -> Document<ModelFile, EstimatingSizeProvider> {
        let model = ModelFile::new(
            Model::new("bench.ldr")
                .with_parts([Part::new("3001.dat", 4), Part::new("3020.dat", 1)])
                .with_steps([vec![0], vec![1]]),
        );
        let mut doc = Document::new(model, EstimatingSizeProvider::default());
        doc.import_model(&ImportOptions::default()).unwrap();
        doc
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = std::env::temp_dir();
        let file_path = temp_dir.join("lic_native_roundtrip.lic");

        let doc = sample_document();
        let mut metadata = DocumentMetadata::for_model(doc.model());
        metadata.author = "Tester".to_string();

        // 保存
        save_document(&file_path, &doc, &mut metadata).expect("Failed to save");

        // 加载
        let (loaded_metadata, loaded) =
            open(&file_path, EstimatingSizeProvider::default()).expect("Failed to load");

        assert_eq!(loaded_metadata.id, metadata.id);
        assert_eq!(loaded_metadata.author, "Tester");
        assert_eq!(loaded.model(), doc.model());
        assert_eq!(loaded.state().pages, doc.state().pages);
        assert_eq!(loaded.state().steps.len(), 2);

        // 清理
        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let file_path = std::env::temp_dir().join("lic_native_newer.lic");
        let doc = sample_document();
        let mut content = LicContent::from_document(&doc, DocumentMetadata::default());
        content.format_version = FORMAT_VERSION + 1;
        write_content(&file_path, &content).expect("Failed to save");

        let result = load(&file_path);
        assert!(matches!(result, Err(FileError::UnsupportedVersion(_))));

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_missing_model_is_rejected() {
        let file_path = std::env::temp_dir().join("lic_native_no_model.lic");
        std::fs::write(&file_path, r#"{ "format_version": 1, "state": {} }"#).unwrap();

        let result = load(&file_path);
        assert!(matches!(result, Err(FileError::MissingModel(_))));

        std::fs::write(&file_path, r#"{ "state": {} }"#).unwrap();
        assert!(matches!(load(&file_path), Err(FileError::InvalidFormat(_))));

        std::fs::remove_file(&file_path).ok();
    }
}
