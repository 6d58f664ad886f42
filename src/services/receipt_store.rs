// src/services/receipt_store.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

// Arquivo recebido no multipart, ainda não gravado.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReceiptUpload {
    /// Confere extensão e tamanho; devolve a extensão normalizada.
    pub fn validate(&self) -> Result<String, AppError> {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BadRequest(
                "Tipo de archivo no permitido. Solo se aceptan PDF, JPG, JPEG y PNG.".to_string(),
            ));
        }
        if self.bytes.len() > MAX_RECEIPT_BYTES {
            return Err(AppError::BadRequest(
                "El archivo es demasiado grande. Máximo 5MB.".to_string(),
            ));
        }
        Ok(extension)
    }
}

pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Onde os comprovantes ficam guardados.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Grava o arquivo e devolve o caminho a guardar na venda.
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, AppError>;

    /// Remove o arquivo. Arquivo inexistente não é erro.
    async fn remove(&self, path: &str) -> Result<(), AppError>;

    /// `None` se o arquivo sumiu.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, AppError>;
}

// Comprovantes no disco local, dentro de UPLOAD_DIR.
#[derive(Debug, Clone)]
pub struct LocalReceiptStore {
    dir: PathBuf,
}

impl LocalReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReceiptStore for LocalReceiptStore {
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("receipt_{}.{}", Uuid::new_v4(), extension);
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, size: usize) -> ReceiptUpload {
        ReceiptUpload { file_name: name.to_string(), bytes: vec![0u8; size] }
    }

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert_eq!(upload("pago.PDF", 10).validate().unwrap(), "pdf");
        assert_eq!(upload("foto.jpeg", 10).validate().unwrap(), "jpeg");
    }

    #[test]
    fn rejects_unknown_extension_and_oversized_files() {
        assert!(upload("script.exe", 10).validate().is_err());
        assert!(upload("sin_extension", 10).validate().is_err());
        assert!(upload("grande.png", MAX_RECEIPT_BYTES + 1).validate().is_err());
        assert!(upload("justo.png", MAX_RECEIPT_BYTES).validate().is_ok());
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a/receipt_x.pdf"), "application/pdf");
        assert_eq!(content_type_for("receipt_x.JPG"), "image/jpeg");
        assert_eq!(content_type_for("receipt_x.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn local_store_saves_reads_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReceiptStore::new(dir.path().join("comprobantes"));

        let path = store.save("png", b"fake-png").await.unwrap();
        assert!(path.ends_with(".png"));
        assert!(Path::new(&path)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("receipt_"));
        assert_eq!(store.read(&path).await.unwrap().as_deref(), Some(&b"fake-png"[..]));

        store.remove(&path).await.unwrap();
        assert!(store.read(&path).await.unwrap().is_none());
        // Remover de novo não falha.
        store.remove(&path).await.unwrap();
    }
}
