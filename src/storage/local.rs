//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{EXPORT_HEADER, PathsConfig, ProductRecord, SuitIndex};
use crate::storage::ProductStorage;

/// UTF-8 byte-order mark written at the start of the export.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Field delimiter of the export.
const DELIMITER: u8 = b';';

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    export_file: PathBuf,
    suits_file: PathBuf,
    images_dir: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing to the configured paths.
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            export_file: paths.export_file.clone(),
            suits_file: paths.suits_file.clone(),
            images_dir: paths.images_dir.clone(),
        }
    }

    /// Create a LocalStorage with every output under one directory.
    pub fn rooted(root_dir: impl AsRef<Path>) -> Self {
        let root = root_dir.as_ref();
        let defaults = PathsConfig::default();
        Self {
            export_file: root.join(defaults.export_file),
            suits_file: root.join(defaults.suits_file),
            images_dir: root.join(defaults.images_dir),
        }
    }

    /// Directory holding the images of one product.
    pub fn product_dir(&self, ordinal: usize, name: &str) -> PathBuf {
        self.images_dir
            .join(format!("{}. {}", ordinal, sanitize_dir_name(name)))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn remove_if_exists(path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Render records as a `;`-delimited CSV with a BOM and header row.
pub fn render_export(records: &[ProductRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

/// Characters rejected in directory names by at least one supported platform.
const RESERVED_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace reserved characters so a product name stays one valid directory.
fn sanitize_dir_name(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
impl ProductStorage for LocalStorage {
    async fn reset_images(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.images_dir).await {
            Ok(()) => {
                log::debug!("Cleared image directory {}", self.images_dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn save_image(
        &self,
        ordinal: usize,
        name: &str,
        position: usize,
        bytes: &[u8],
    ) -> Result<String> {
        let dir = self.product_dir(ordinal, name);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("image{position}.jpg"));
        tokio::fs::write(&path, bytes).await?;
        Ok(path.display().to_string())
    }

    async fn write_export(&self, records: &[ProductRecord]) -> Result<String> {
        let bytes = render_export(records)?;
        self.write_bytes(&self.export_file, &bytes).await?;
        log::info!(
            "Export: {} rows written to {}",
            records.len(),
            self.export_file.display()
        );
        Ok(self.export_file.display().to_string())
    }

    async fn write_suit_index(&self, index: &SuitIndex) -> Result<Option<String>> {
        if index.is_empty() {
            if Self::remove_if_exists(&self.suits_file).await? {
                log::debug!("Removed stale {}", self.suits_file.display());
            }
            return Ok(None);
        }

        let bytes = serde_json::to_vec_pretty(index)?;
        self.write_bytes(&self.suits_file, &bytes).await?;
        log::info!(
            "Suit index: {} products written to {}",
            index.len(),
            self.suits_file.display()
        );
        Ok(Some(self.suits_file.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use tempfile::TempDir;

    fn sample_record() -> ProductRecord {
        let mut record = ProductRecord::sentinel("55", "https://shop.example/product/55");
        record.name = "Костюм; Classic".to_string();
        record.gender = Gender::Male;
        record.main_image = "https://cdn.example/c.jpg".to_string();
        record.extra_images = vec![
            "https://cdn.example/b.jpg".to_string(),
            "https://cdn.example/d.jpg".to_string(),
        ];
        record
    }

    #[test]
    fn test_render_export_layout() {
        let bytes = render_export(&[sample_record()]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "URL;ID;Name;Brand;Article;Gender;Image;Ext Images;Description;Sizes;Color;Category"
        );
        assert_eq!(
            lines.next().unwrap(),
            "https://shop.example/product/55;55;\"Костюм; Classic\";N/A;N/A;male;\
             https://cdn.example/c.jpg;https://cdn.example/b.jpg,https://cdn.example/d.jpg;;;;N/A"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_sanitize_dir_name() {
        assert_eq!(sanitize_dir_name("Пиджак 1/2 \\ test"), "Пиджак 1_2 _ test");
        assert_eq!(
            sanitize_dir_name(r#"Костюм "Classic": 3*2? <a>|b"#),
            "Костюм _Classic__ 3_2_ _a__b"
        );
    }

    #[tokio::test]
    async fn test_save_image_with_reserved_characters() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted(tmp.path());

        storage
            .save_image(2, "Смокинг: \"Black|Tie\"", 1, b"jpeg")
            .await
            .unwrap();

        let path = tmp
            .path()
            .join("images")
            .join("2. Смокинг_ _Black_Tie_")
            .join("image1.jpg");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_image_layout() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted(tmp.path());

        storage.save_image(3, "Костюм", 2, b"jpeg").await.unwrap();

        let path = tmp.path().join("images").join("3. Костюм").join("image2.jpg");
        assert_eq!(std::fs::read(path).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_reset_images() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted(tmp.path());

        storage.reset_images().await.unwrap();
        storage.save_image(1, "A", 1, b"x").await.unwrap();
        storage.reset_images().await.unwrap();
        assert!(!tmp.path().join("images").exists());
    }

    #[tokio::test]
    async fn test_suit_index_written_and_removed() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted(tmp.path());
        let path = tmp.path().join("suits.json");

        let mut index = SuitIndex::new();
        index.insert(
            "Смокинг".to_string(),
            vec!["https://cdn.example/1.jpg".to_string()],
        );
        assert!(storage.write_suit_index(&index).await.unwrap().is_some());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Смокинг\": ["));
        assert!(text.contains("\n  "));

        assert!(storage.write_suit_index(&SuitIndex::new()).await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_export_replaces_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted(tmp.path());

        storage.write_export(&[sample_record()]).await.unwrap();
        storage.write_export(&[]).await.unwrap();

        let bytes = std::fs::read(tmp.path().join("product.csv")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_start_matches('\u{feff}').lines().count(), 1);
    }
}
