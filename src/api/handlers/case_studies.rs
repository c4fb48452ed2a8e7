use crate::AppState;
use crate::api::error::AppError;
use crate::entities::case_studies::{self, CaseStudyStatus, SeoMetadata};
use crate::services::case_study_service::{CreateCaseStudy, RawSection, UpdateCaseStudy};
use crate::utils::validation;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct CaseStudyResponse {
    pub status: String,
    pub message: String,
    pub data: case_studies::Model,
}

#[derive(Serialize, ToSchema)]
pub struct CaseStudyListResponse {
    pub status: String,
    pub count: usize,
    pub data: Vec<case_studies::Model>,
}

#[derive(Serialize, ToSchema)]
pub struct SingleCaseStudyResponse {
    pub status: String,
    pub data: case_studies::Model,
}

#[derive(Serialize, ToSchema)]
pub struct DeletedResponse {
    pub status: String,
    pub message: String,
}

/// An uploaded file, buffered while the form is read. Nothing is pushed to
/// the image store until the whole form has parsed cleanly.
struct ImageUpload {
    filename: String,
    data: Vec<u8>,
}

/// Structured view of the multipart form. Text fields submitted as empty
/// strings are treated as not supplied, matching how the editor frontend
/// clears its inputs.
#[derive(Default)]
struct CaseStudyForm {
    title: Option<String>,
    category: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    project_description: Option<String>,
    status: Option<CaseStudyStatus>,
    sections: Option<Vec<RawSection>>,
    seo: Option<SeoMetadata>,
    image: Option<ImageUpload>,
    section_images: Vec<ImageUpload>,
}

impl CaseStudyForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::MalformedPayload(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or("image").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::MalformedPayload(e.to_string()))?
                        .to_vec();
                    form.image = Some(ImageUpload { filename, data });
                }
                "sectionImages" => {
                    let filename = field.file_name().unwrap_or("section").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::MalformedPayload(e.to_string()))?
                        .to_vec();
                    form.section_images.push(ImageUpload { filename, data });
                }
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
                    if text.is_empty() {
                        continue;
                    }
                    match name.as_str() {
                        "title" => form.title = Some(text),
                        "category" => form.category = Some(text),
                        "slug" => form.slug = Some(text),
                        "description" => form.description = Some(text),
                        "projectDescription" => form.project_description = Some(text),
                        "status" => {
                            form.status = Some(text.parse().map_err(|_| {
                                AppError::Validation(format!("Invalid status '{}'", text))
                            })?)
                        }
                        "bodyData" => {
                            form.sections = Some(serde_json::from_str(&text).map_err(|_| {
                                AppError::MalformedPayload("Invalid bodyData JSON".to_string())
                            })?)
                        }
                        "seo" => {
                            form.seo = Some(serde_json::from_str(&text).map_err(|_| {
                                AppError::MalformedPayload("Invalid seo JSON".to_string())
                            })?)
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(form)
    }
}

/// Validates the upload and pushes it to the image store under a fresh key
/// inside the configured folder.
async fn store_image(state: &AppState, upload: ImageUpload) -> Result<String, AppError> {
    let extension =
        validation::validate_image(&upload.filename, &upload.data, state.config.max_upload_size)
            .map_err(|e| AppError::Validation(e.to_string()))?;

    let key = format!(
        "{}/{}.{}",
        state.config.upload_folder,
        Uuid::new_v4(),
        extension
    );
    state
        .storage
        .put_image(&key, upload.data, validation::content_type_for(&extension))
        .await?;
    Ok(key)
}

async fn store_section_images(
    state: &AppState,
    uploads: Vec<ImageUpload>,
) -> Result<Vec<String>, AppError> {
    let mut keys = Vec::with_capacity(uploads.len());
    for upload in uploads {
        keys.push(store_image(state, upload).await?);
    }
    Ok(keys)
}

#[utoipa::path(
    post,
    path = "/case-studies/create",
    request_body(content = Object, description = "Multipart form: text fields (title, category, slug, description, projectDescription, status), JSON-encoded fields (bodyData, seo), files (image, sectionImages)", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Case study created", body = CaseStudyResponse),
        (status = 400, description = "Missing title or malformed JSON field"),
        (status = 409, description = "A case study with this title already exists")
    ),
    tag = "case-studies"
)]
pub async fn create_case_study(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = CaseStudyForm::from_multipart(multipart).await?;

    let image = match form.image {
        Some(upload) => Some(store_image(&state, upload).await?),
        None => None,
    };
    let section_images = store_section_images(&state, form.section_images).await?;

    let record = state
        .case_studies
        .create(CreateCaseStudy {
            title: form.title,
            category: form.category,
            slug: form.slug,
            description: form.description,
            project_description: form.project_description,
            status: form.status,
            image,
            sections: form.sections,
            seo: form.seo,
            section_images,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CaseStudyResponse {
            status: "success".to_string(),
            message: "Case study created successfully".to_string(),
            data: record,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/case-studies",
    responses(
        (status = 200, description = "All case studies, most recent first", body = CaseStudyListResponse)
    ),
    tag = "case-studies"
)]
pub async fn list_case_studies(
    State(state): State<AppState>,
) -> Result<Json<CaseStudyListResponse>, AppError> {
    let records = state.case_studies.list().await?;

    Ok(Json(CaseStudyListResponse {
        status: "success".to_string(),
        count: records.len(),
        data: records,
    }))
}

#[utoipa::path(
    get,
    path = "/case-studies/id/{id}",
    params(("id" = String, Path, description = "Case study id")),
    responses(
        (status = 200, description = "Case study found", body = SingleCaseStudyResponse),
        (status = 404, description = "No case study with this id")
    ),
    tag = "case-studies"
)]
pub async fn get_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleCaseStudyResponse>, AppError> {
    let record = state.case_studies.get(&id).await?;

    Ok(Json(SingleCaseStudyResponse {
        status: "success".to_string(),
        data: record,
    }))
}

#[utoipa::path(
    get,
    path = "/case-studies/slug/{slug}",
    params(("slug" = String, Path, description = "URL-friendly identifier")),
    responses(
        (status = 200, description = "Case study found", body = SingleCaseStudyResponse),
        (status = 404, description = "No case study with this slug")
    ),
    tag = "case-studies"
)]
pub async fn get_case_study_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SingleCaseStudyResponse>, AppError> {
    let record = state.case_studies.get_by_slug(&slug).await?;

    Ok(Json(SingleCaseStudyResponse {
        status: "success".to_string(),
        data: record,
    }))
}

#[utoipa::path(
    put,
    path = "/case-studies/{id}",
    params(("id" = String, Path, description = "Case study id")),
    request_body(content = Object, description = "Multipart form, same shape as create, all fields optional", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Case study updated", body = CaseStudyResponse),
        (status = 400, description = "Malformed JSON field"),
        (status = 404, description = "No case study with this id")
    ),
    tag = "case-studies"
)]
pub async fn update_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CaseStudyResponse>, AppError> {
    let form = CaseStudyForm::from_multipart(multipart).await?;

    let image = match form.image {
        Some(upload) => Some(store_image(&state, upload).await?),
        None => None,
    };
    let section_images = store_section_images(&state, form.section_images).await?;

    let record = state
        .case_studies
        .update(
            &id,
            UpdateCaseStudy {
                title: form.title,
                description: form.description,
                image,
                sections: form.sections,
                section_images,
            },
        )
        .await?;

    Ok(Json(CaseStudyResponse {
        status: "success".to_string(),
        message: "Case study updated successfully".to_string(),
        data: record,
    }))
}

#[utoipa::path(
    delete,
    path = "/case-studies/{id}",
    params(("id" = String, Path, description = "Case study id")),
    responses(
        (status = 200, description = "Case study deleted", body = DeletedResponse),
        (status = 404, description = "No case study with this id")
    ),
    tag = "case-studies"
)]
pub async fn delete_case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.case_studies.delete(&id).await?;

    Ok(Json(DeletedResponse {
        status: "success".to_string(),
        message: "Case study deleted successfully".to_string(),
    }))
}
