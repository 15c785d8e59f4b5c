use crate::helpers::{JsonResponse, UploadError, UploadPolicy};
use crate::views::upload::StoredFile;
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{get, post, web, Responder, Result};

#[tracing::instrument(name = "Upload file.", skip(payload, policy))]
#[post("/upload")]
pub async fn upload_handler(
    payload: Multipart,
    policy: web::Data<UploadPolicy>,
) -> Result<impl Responder> {
    let files = policy.read_files(payload, "file", 1).await?;
    let mut stored = policy.save(files).await?;
    let file = stored.pop().ok_or(UploadError::Missing)?;

    Ok(JsonResponse::<StoredFile>::build()
        .set_item(file)
        .ok("File uploaded successfully"))
}

#[tracing::instrument(name = "Upload files.", skip(payload, policy))]
#[post("/upload-multiple")]
pub async fn upload_multiple_handler(
    payload: Multipart,
    policy: web::Data<UploadPolicy>,
) -> Result<impl Responder> {
    let files = policy.read_files(payload, "files", policy.max_files).await?;
    let stored = policy.save(files).await?;

    Ok(JsonResponse::<StoredFile>::build()
        .set_list(stored)
        .ok("Files uploaded successfully"))
}

#[tracing::instrument(name = "Serve uploaded file.", skip(policy))]
#[get("/uploads/{filename}")]
pub async fn serve_handler(
    path: web::Path<(String,)>,
    policy: web::Data<UploadPolicy>,
) -> Result<NamedFile> {
    let file_path = policy.resolve(&path.0)?;

    NamedFile::open_async(&file_path).await.map_err(|err| -> actix_web::Error {
        if err.kind() == std::io::ErrorKind::NotFound {
            UploadError::NotFound.into()
        } else {
            UploadError::Io(err).into()
        }
    })
}
