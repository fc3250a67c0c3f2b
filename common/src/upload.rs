//! アップロード可能なファイルの判定

use crate::error::{Error, Result};

/// 許可する拡張子
pub const ALLOWED_EXTENSIONS: &[&str] = &["html", "pdf", "docx"];

/// アップロード文書の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "html" => Some(DocumentKind::Html),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Html => "text/html",
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// ファイル名の拡張子を検証
///
/// 許可リスト外ならネットワークに出る前に `UnsupportedFileType` を返す
pub fn validate_upload(file_name: &str) -> Result<DocumentKind> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .and_then(DocumentKind::from_extension)
        .ok_or_else(|| Error::UnsupportedFileType(file_name.to_string()))
}

/// アップロードするファイル
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let kind = validate_upload(&file_name)?;
        Ok(Self { file_name, kind, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_allowed() {
        assert_eq!(validate_upload("resume.html").unwrap(), DocumentKind::Html);
        assert_eq!(validate_upload("cv.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(validate_upload("my.cv.docx").unwrap(), DocumentKind::Docx);
    }

    #[test]
    fn test_validate_case_insensitive() {
        assert_eq!(validate_upload("RESUME.HTML").unwrap(), DocumentKind::Html);
        assert_eq!(validate_upload("cv.Pdf").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_validate_rejected() {
        for name in ["resume.txt", "photo.png", "old.doc", "resume", "archive.html.zip", ".pdfx"] {
            let err = validate_upload(name).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFileType(_)), "{} は拒否されるべき", name);
        }
    }

    #[test]
    fn test_upload_file_mime() {
        let file = UploadFile::new("resume.html", b"<html></html>".to_vec()).unwrap();
        assert_eq!(file.mime_type(), "text/html");
        assert!(UploadFile::new("resume.rtf", vec![]).is_err());
    }
}
