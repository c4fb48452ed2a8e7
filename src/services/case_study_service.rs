use crate::api::error::AppError;
use crate::entities::case_studies::{self, BodyData, CaseStudyStatus, Section, SeoMetadata};
use crate::entities::prelude::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Section descriptor as submitted by the editor frontend. `has_image` flags
/// which sections consume an entry from the uploaded section-image list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSection {
    pub heading: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub lists: Vec<String>,
    #[serde(default)]
    pub has_image: bool,
}

#[derive(Debug, Default, Validate)]
pub struct CreateCaseStudy {
    #[validate(required(message = "Title is required"), length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub project_description: Option<String>,
    pub status: Option<CaseStudyStatus>,
    /// Main image key, already uploaded by the request parser
    pub image: Option<String>,
    pub sections: Option<Vec<RawSection>>,
    pub seo: Option<SeoMetadata>,
    /// Section image keys in submission order, already uploaded
    pub section_images: Vec<String>,
}

/// Partial update; `None` (and empty strings, normalized away by the request
/// parser) leave the stored value untouched.
#[derive(Debug, Default)]
pub struct UpdateCaseStudy {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sections: Option<Vec<RawSection>>,
    pub section_images: Vec<String>,
}

pub struct CaseStudyService {
    db: DatabaseConnection,
}

impl CaseStudyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateCaseStudy) -> Result<case_studies::Model, AppError> {
        input
            .validate()
            .map_err(|_| AppError::Validation("Title is required".to_string()))?;
        let title = input.title.unwrap_or_default();

        let exists = CaseStudies::find()
            .filter(case_studies::Column::Title.eq(&title))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Err(AppError::Conflict("Case study already exists".to_string()));
        }

        let body_data = assemble_sections(
            input.sections.unwrap_or_default(),
            &input.section_images,
        );

        let now = Utc::now();
        let record = case_studies::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(title),
            category: Set(input.category),
            slug: Set(input.slug),
            description: Set(input.description),
            project_description: Set(input.project_description),
            image: Set(input.image),
            status: Set(input.status.unwrap_or_default()),
            body_data: Set(BodyData(body_data)),
            seo: Set(input.seo),
            user_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match record.insert(&self.db).await {
            Ok(model) => Ok(model),
            // The pre-check above races with concurrent creates; the unique
            // index on title has the final say.
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(AppError::Conflict("Case study already exists".to_string()))
                }
                _ => Err(e.into()),
            },
        }
    }

    /// All records, most recently created first
    pub async fn list(&self) -> Result<Vec<case_studies::Model>, AppError> {
        Ok(CaseStudies::find()
            .order_by_desc(case_studies::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, id: &str) -> Result<case_studies::Model, AppError> {
        CaseStudies::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Case study not found".to_string()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<case_studies::Model, AppError> {
        CaseStudies::find()
            .filter(case_studies::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Case study not found".to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        input: UpdateCaseStudy,
    ) -> Result<case_studies::Model, AppError> {
        let existing = self.get(id).await?;
        let previous_sections = existing.body_data.0.clone();
        let mut record: case_studies::ActiveModel = existing.into();

        if let Some(image) = input.image {
            record.image = Set(Some(image));
        }
        if let Some(title) = input.title.filter(|t| !t.is_empty()) {
            record.title = Set(title);
        }
        if let Some(description) = input.description.filter(|d| !d.is_empty()) {
            record.description = Set(Some(description));
        }
        if let Some(sections) = input.sections {
            record.body_data = Set(BodyData(merge_sections(
                sections,
                &previous_sections,
                &input.section_images,
            )));
        }
        record.updated_at = Set(Utc::now());

        Ok(record.update(&self.db).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let res = CaseStudies::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Case study not found".to_string()));
        }
        Ok(())
    }
}

/// Builds the stored section list for a create. Sections flagged `has_image`
/// consume uploaded image keys positionally; once the cursor runs past the
/// end of the list the remaining flagged sections get no image. The cursor
/// still advances for every flagged section.
fn assemble_sections(descriptors: Vec<RawSection>, images: &[String]) -> Vec<Section> {
    let mut cursor = 0usize;
    descriptors
        .into_iter()
        .map(|raw| {
            let image = if raw.has_image {
                let image = images.get(cursor).cloned();
                cursor += 1;
                image
            } else {
                None
            };
            Section {
                heading: raw.heading,
                description: raw.description,
                image,
                lists: raw.lists,
            }
        })
        .collect()
}

/// Rebuilds the section list for an update. Each section at position `i`
/// inherits the image stored at position `i` of the previous list, then a
/// `has_image` flag overrides it with the next unconsumed new upload, if one
/// exists. Unconsumed uploads are dropped.
fn merge_sections(
    descriptors: Vec<RawSection>,
    previous: &[Section],
    new_images: &[String],
) -> Vec<Section> {
    let mut cursor = 0usize;
    descriptors
        .into_iter()
        .enumerate()
        .map(|(position, raw)| {
            let mut image = previous.get(position).and_then(|s| s.image.clone());
            if raw.has_image {
                if let Some(fresh) = new_images.get(cursor) {
                    image = Some(fresh.clone());
                    cursor += 1;
                }
            }
            Section {
                heading: raw.heading,
                description: raw.description,
                image,
                lists: raw.lists,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(heading: &str, has_image: bool) -> RawSection {
        RawSection {
            heading: Some(heading.to_string()),
            description: None,
            lists: vec![],
            has_image,
        }
    }

    fn stored(heading: &str, image: Option<&str>) -> Section {
        Section {
            heading: Some(heading.to_string()),
            description: None,
            image: image.map(String::from),
            lists: vec![],
        }
    }

    fn keys(sections: &[Section]) -> Vec<Option<&str>> {
        sections.iter().map(|s| s.image.as_deref()).collect()
    }

    #[test]
    fn assemble_assigns_images_positionally() {
        let sections = assemble_sections(
            vec![
                descriptor("a", true),
                descriptor("b", false),
                descriptor("c", true),
            ],
            &["img-a".to_string(), "img-b".to_string()],
        );
        assert_eq!(keys(&sections), vec![Some("img-a"), None, Some("img-b")]);
    }

    #[test]
    fn assemble_cursor_runs_past_end() {
        let sections = assemble_sections(
            vec![
                descriptor("a", true),
                descriptor("b", true),
                descriptor("c", true),
            ],
            &["only".to_string()],
        );
        assert_eq!(keys(&sections), vec![Some("only"), None, None]);
    }

    #[test]
    fn assemble_unflagged_sections_never_consume() {
        let sections = assemble_sections(
            vec![descriptor("a", false), descriptor("b", true)],
            &["img".to_string()],
        );
        assert_eq!(keys(&sections), vec![None, Some("img")]);
    }

    #[test]
    fn assemble_preserves_declaration_order() {
        let sections = assemble_sections(
            vec![descriptor("first", false), descriptor("second", false)],
            &[],
        );
        let headings: Vec<_> = sections.iter().map(|s| s.heading.as_deref()).collect();
        assert_eq!(headings, vec![Some("first"), Some("second")]);
    }

    #[test]
    fn merge_keeps_slot_images_without_new_files() {
        let previous = [stored("a", Some("old-a")), stored("b", Some("old-b"))];
        let sections = merge_sections(
            vec![descriptor("a2", false), descriptor("b2", false)],
            &previous,
            &[],
        );
        assert_eq!(keys(&sections), vec![Some("old-a"), Some("old-b")]);
    }

    #[test]
    fn merge_carries_image_by_numeric_slot_on_reorder() {
        // Reordered descriptors inherit whatever image sat at their numeric
        // position, not the image of the logical section they came from.
        let previous = [stored("a", Some("old-a")), stored("b", Some("old-b"))];
        let sections = merge_sections(
            vec![descriptor("b", false), descriptor("a", false)],
            &previous,
            &[],
        );
        assert_eq!(keys(&sections), vec![Some("old-a"), Some("old-b")]);
    }

    #[test]
    fn merge_override_consumes_new_files_in_order() {
        let previous = [stored("a", Some("old-a")), stored("b", None)];
        let sections = merge_sections(
            vec![descriptor("a", true), descriptor("b", true)],
            &previous,
            &["new-1".to_string(), "new-2".to_string()],
        );
        assert_eq!(keys(&sections), vec![Some("new-1"), Some("new-2")]);
    }

    #[test]
    fn merge_flagged_section_without_file_keeps_old_image() {
        let previous = [stored("a", Some("old-a"))];
        let sections = merge_sections(vec![descriptor("a", true)], &previous, &[]);
        assert_eq!(keys(&sections), vec![Some("old-a")]);
    }

    #[test]
    fn merge_extra_files_are_dropped() {
        let previous = [stored("a", None)];
        let sections = merge_sections(
            vec![descriptor("a", true)],
            &previous,
            &["used".to_string(), "never-consumed".to_string()],
        );
        assert_eq!(keys(&sections), vec![Some("used")]);
    }

    #[test]
    fn merge_grown_list_gets_no_image_for_new_positions() {
        let previous = [stored("a", Some("old-a"))];
        let sections = merge_sections(
            vec![descriptor("a", false), descriptor("fresh", false)],
            &previous,
            &[],
        );
        assert_eq!(keys(&sections), vec![Some("old-a"), None]);
    }

    #[test]
    fn raw_section_parses_camel_case() {
        let raw: Vec<RawSection> = serde_json::from_str(
            r#"[{"heading":"h","description":"d","lists":["x"],"hasImage":true}]"#,
        )
        .unwrap();
        assert!(raw[0].has_image);
        assert_eq!(raw[0].lists, vec!["x".to_string()]);
    }
}
