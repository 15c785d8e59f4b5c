use crate::configuration::UploadSettings;
use crate::helpers::JsonResponse;
use crate::views::upload::StoredFile;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::http::StatusCode;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{HttpResponse, ResponseError};
use futures::StreamExt;
use rand::Rng;
use std::path::{Path, PathBuf};

pub const URL_PREFIX: &str = "/uploads/";

const INITIAL_ALLOC_BYTES: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file type. Only {0} files are allowed")]
    InvalidType(String),
    #[error("File too large. Maximum size is {0} bytes")]
    TooLarge(usize),
    #[error("Too many files. Maximum is {0}")]
    TooManyFiles(usize),
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),
    #[error("No file uploaded")]
    Missing,
    #[error("Invalid file reference")]
    InvalidName,
    #[error("File not found")]
    NotFound,
    #[error("Malformed multipart request: {0}")]
    Multipart(String),
    #[error("Failed to store file")]
    Io(#[from] std::io::Error),
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NotFound => StatusCode::NOT_FOUND,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let UploadError::Io(err) = self {
            tracing::error!("Upload storage failure: {:?}", err);
        }

        HttpResponse::build(self.status_code()).json(JsonResponse::<()> {
            message: self.to_string(),
            data: None,
        })
    }
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// A file read from the request but not yet written.
#[derive(Debug)]
pub struct PendingFile {
    pub field: String,
    pub original_name: String,
    pub mimetype: String,
    pub ext: String,
    pub bytes: Bytes,
}

/// The single upload policy shared by `/upload*` and order file registration.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub dir: PathBuf,
    pub max_file_size: usize,
    pub max_files: usize,
    allowed: Vec<String>,
}

impl From<&UploadSettings> for UploadPolicy {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            max_file_size: settings.max_file_size,
            max_files: settings.max_files,
            allowed: settings
                .allowed_types
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl UploadPolicy {
    fn allows(&self, value: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == value)
    }

    fn invalid_type(&self) -> UploadError {
        UploadError::InvalidType(self.allowed.join(", "))
    }

    /// Both the extension and the declared MIME subtype must be allowed.
    pub fn check_type(&self, filename: &str, mimetype: &str) -> Result<String, UploadError> {
        let ext = extension(filename).ok_or_else(|| self.invalid_type())?;
        let subtype = mimetype
            .split('/')
            .nth(1)
            .map(|subtype| subtype.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if self.allows(&ext) && self.allows(&subtype) {
            Ok(ext)
        } else {
            Err(self.invalid_type())
        }
    }

    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_file_size {
            return Err(UploadError::TooLarge(self.max_file_size));
        }
        Ok(())
    }

    /// `<field>-<unix millis>-<random>.<ext>`
    pub fn generate_filename(field: &str, ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("{}-{}-{}.{}", field, millis, suffix, ext)
    }

    /// Path of a stored file; anything that could escape the upload root is refused.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, UploadError> {
        let valid = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains("..")
            && !filename.contains('/')
            && !filename.contains('\\');
        if !valid {
            return Err(UploadError::InvalidName);
        }

        Ok(self.dir.join(filename))
    }

    /// Maps `/uploads/<filename>` to a file on disk.
    pub fn resolve_url(&self, url: &str) -> Result<(String, PathBuf), UploadError> {
        let filename = url
            .trim()
            .strip_prefix(URL_PREFIX)
            .ok_or(UploadError::InvalidName)?;
        let path = self.resolve(filename)?;
        Ok((filename.to_string(), path))
    }

    /// Metadata for an already stored file, checked against the same policy as uploads.
    pub async fn stat(&self, url: &str) -> Result<StoredFile, UploadError> {
        let (filename, path) = self.resolve_url(url)?;
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(UploadError::NotFound),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(UploadError::NotFound)
            }
            Err(err) => return Err(err.into()),
        };

        let ext = extension(&filename).ok_or_else(|| self.invalid_type())?;
        let mimetype = content_type_for(&ext);
        self.check_type(&filename, mimetype)?;
        let size = metadata.len() as usize;
        self.check_size(size)?;

        Ok(StoredFile {
            original_name: filename.clone(),
            url: format!("{}{}", URL_PREFIX, filename),
            filename,
            mimetype: mimetype.to_string(),
            size,
            file_type: ext,
        })
    }

    /// Reads every part of `field_name`; nothing touches the disk here.
    #[tracing::instrument(name = "Read multipart files.", skip(self, payload))]
    pub async fn read_files(
        &self,
        mut payload: Multipart,
        field_name: &str,
        max_files: usize,
    ) -> Result<Vec<PendingFile>, UploadError> {
        let mut files = Vec::new();

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|err| UploadError::Multipart(err.to_string()))?;
            let content_disposition = field.content_disposition().clone();
            let name = content_disposition.get_name().unwrap_or_default().to_string();
            if name != field_name {
                return Err(UploadError::UnexpectedField(name));
            }

            let original_name = content_disposition
                .get_filename()
                .map(str::to_string)
                .ok_or(UploadError::Missing)?;
            let mimetype = field
                .content_type()
                .map(|mime| mime.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let ext = self.check_type(&original_name, &mimetype)?;

            if files.len() >= max_files {
                return Err(UploadError::TooManyFiles(max_files));
            }

            let bytes = read_from_field(&mut field, self.max_file_size).await?;
            files.push(PendingFile {
                field: name,
                original_name,
                mimetype,
                ext,
                bytes,
            });
        }

        if files.is_empty() {
            return Err(UploadError::Missing);
        }

        Ok(files)
    }

    /// Writes already validated files under generated names.
    #[tracing::instrument(name = "Store uploaded files.", skip(self, files))]
    pub async fn save(&self, files: Vec<PendingFile>) -> Result<Vec<StoredFile>, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let filename = Self::generate_filename(&file.field, &file.ext);
            tokio::fs::write(self.dir.join(&filename), &file.bytes).await?;
            tracing::info!("Stored upload {} ({} bytes)", filename, file.bytes.len());

            stored.push(StoredFile {
                original_name: file.original_name,
                url: format!("{}{}", URL_PREFIX, filename),
                filename,
                mimetype: file.mimetype,
                size: file.bytes.len(),
                file_type: file.ext,
            });
        }

        Ok(stored)
    }
}

/// Buffers one multipart field, aborting as soon as it grows past `cap`.
pub async fn read_from_field(field: &mut Field, cap: usize) -> Result<Bytes, UploadError> {
    let capacity = match field.headers().get(&CONTENT_LENGTH) {
        None => INITIAL_ALLOC_BYTES,
        Some(len) => match len.to_str().ok().and_then(|len| len.parse::<u64>().ok()) {
            None => INITIAL_ALLOC_BYTES,
            Some(len) if len as usize > cap => return Err(UploadError::TooLarge(cap)),
            Some(len) => (len as usize).min(INITIAL_ALLOC_BYTES),
        },
    };

    let mut bytes = BytesMut::with_capacity(capacity);
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| UploadError::Multipart(err.to_string()))?;
        if bytes.len() + chunk.len() > cap {
            return Err(UploadError::TooLarge(cap));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes.freeze())
}
