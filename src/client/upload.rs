use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest resume the backend accepts.
pub const MAX_RESUME_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ResumeFileError {
    #[error("unsupported resume format `{0}`; use PDF, DOC or DOCX")]
    UnsupportedFormat(String),

    #[error("resume is {size} bytes; the limit is 10 MB")]
    TooLarge { size: u64 },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A resume read into memory and ready for the multipart upload.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub content: Bytes,
}

fn content_type_for(path: &Path) -> Result<&'static str, ResumeFileError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok("application/pdf"),
        "doc" => Ok("application/msword"),
        "docx" => Ok("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => Err(ResumeFileError::UnsupportedFormat(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )),
    }
}

impl ResumeFile {
    /// Read and validate a resume from disk (extension and size checked first).
    pub async fn load(path: &Path) -> Result<Self, ResumeFileError> {
        let content_type = content_type_for(path)?;
        let read_err = |source| ResumeFileError::Read {
            path: path.to_path_buf(),
            source,
        };
        let meta = tokio::fs::metadata(path).await.map_err(read_err)?;
        if meta.len() > MAX_RESUME_BYTES {
            return Err(ResumeFileError::TooLarge { size: meta.len() });
        }
        let content = tokio::fs::read(path).await.map_err(read_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self {
            file_name,
            content_type,
            content: Bytes::from(content),
        })
    }

    pub fn from_bytes(file_name: &str, content: impl Into<Bytes>) -> Result<Self, ResumeFileError> {
        let content: Bytes = content.into();
        if content.len() as u64 > MAX_RESUME_BYTES {
            return Err(ResumeFileError::TooLarge {
                size: content.len() as u64,
            });
        }
        Ok(Self {
            file_name: file_name.to_string(),
            content_type: content_type_for(Path::new(file_name))?,
            content,
        })
    }

    pub fn size_mb(&self) -> f64 {
        self.content.len() as f64 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_office_and_pdf_extensions() {
        assert!(ResumeFile::from_bytes("cv.PDF", vec![1u8, 2, 3]).is_ok());
        assert_eq!(
            ResumeFile::from_bytes("cv.docx", vec![0u8]).unwrap().content_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert!(matches!(
            ResumeFile::from_bytes("cv.txt", vec![0u8]),
            Err(ResumeFileError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_oversized_resume() {
        let big = vec![0u8; (MAX_RESUME_BYTES + 1) as usize];
        assert!(matches!(
            ResumeFile::from_bytes("cv.pdf", big),
            Err(ResumeFileError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let file = ResumeFile::load(&path).await.unwrap();
        assert_eq!(file.file_name, "resume.pdf");
        assert_eq!(file.content.as_ref(), b"%PDF-1.4");

        let missing = ResumeFile::load(&dir.path().join("nope.pdf")).await;
        assert!(matches!(missing, Err(ResumeFileError::Read { .. })));
    }
}
