use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, error, info};

use crate::{
    app::AppState,
    error::AppError,
    libraries::upload_policy::{allowed_file, content_type_for, secure_filename},
    models::Flash,
};

fn flash_redirect(to: &str, flash: Flash) -> Redirect {
    Redirect::to(&format!("{}?flash={}", to, flash.query_value()))
}

/// Accept an image upload, store it, and run it through image intake.
///
/// Form problems redirect back to the upload page with a flash message.
/// Intake failures are logged and leave the image processed with no points.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, AppError> {
    let Ok(mut multipart) = multipart else {
        return Ok(flash_redirect("/upload", Flash::NoFilePart));
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
            upload = Some((filename, data));
            break;
        }
    }

    let Some((original_name, data)) = upload else {
        return Ok(flash_redirect("/upload", Flash::NoFilePart));
    };
    if original_name.is_empty() {
        return Ok(flash_redirect("/upload", Flash::NoSelectedFile));
    }

    let filename = match secure_filename(&original_name) {
        Some(name) if allowed_file(&name) => name,
        _ => {
            debug!("Rejected upload with filename {:?}", original_name);
            return Ok(flash_redirect("/upload", Flash::DisallowedType));
        }
    };

    let path = state.config.upload_folder.join(&filename);
    tokio::fs::write(&path, &data).await?;
    let image = {
        let filename = filename.clone();
        state
            .with_store(move |store| store.create_image(&filename))
            .await?
    };
    info!(
        "Stored upload {} ({} bytes) as image {}",
        filename,
        data.len(),
        image.id
    );

    let (points, result_path) = match state.intake.process(&path, image.id).await {
        Ok(report) => (
            report.points,
            Some(report.result_path.to_string_lossy().into_owned()),
        ),
        Err(e) => {
            error!("Error processing image {}: {}", image.id, e);
            (Vec::new(), None)
        }
    };

    let image_id = image.id;
    state
        .with_store(move |store| {
            store.complete_image_processing(image_id, &points, result_path.as_deref())
        })
        .await?;

    Ok(flash_redirect("/", Flash::Uploaded))
}

/// Serve a stored upload as-is
pub async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    // Only names the upload path could have produced are served
    if secure_filename(&filename).as_deref() != Some(filename.as_str()) {
        return Err(AppError::NotFound);
    }

    let bytes = match tokio::fs::read(state.config.upload_folder.join(&filename)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        bytes,
    )
        .into_response())
}
