use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "case_studies")]
#[serde(rename_all = "camelCase")]
#[schema(as = CaseStudy)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub title: String,
    pub category: Option<String>,
    #[sea_orm(indexed)]
    pub slug: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub project_description: Option<String>,
    pub image: Option<String>,
    pub status: CaseStudyStatus,
    #[sea_orm(column_type = "Json")]
    pub body_data: BodyData,
    #[sea_orm(column_type = "Json", nullable)]
    pub seo: Option<SeoMetadata>,
    pub user_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Editorial lifecycle label. No transitions are enforced; any value in the
/// set may be written directly.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CaseStudyStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl FromStr for CaseStudyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Ordered section list, persisted as a single JSON column. Order is display
/// order and is preserved across updates.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct BodyData(pub Vec<Section>);

/// One entry of a case study's body content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub heading: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub lists: Vec<String>,
}

#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub canonical_link: Option<String>,
    pub focus_keyword: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        assert_eq!("draft".parse::<CaseStudyStatus>(), Ok(CaseStudyStatus::Draft));
        assert_eq!(
            "published".parse::<CaseStudyStatus>(),
            Ok(CaseStudyStatus::Published)
        );
        assert_eq!(
            "archived".parse::<CaseStudyStatus>(),
            Ok(CaseStudyStatus::Archived)
        );
        assert!("Draft".parse::<CaseStudyStatus>().is_err());
        assert!("".parse::<CaseStudyStatus>().is_err());
    }

    #[test]
    fn section_accepts_sparse_json() {
        let section: Section = serde_json::from_str(r#"{"heading":"Intro"}"#).unwrap();
        assert_eq!(section.heading.as_deref(), Some("Intro"));
        assert_eq!(section.image, None);
        assert!(section.lists.is_empty());
    }

    #[test]
    fn model_serializes_camel_case() {
        let seo: SeoMetadata = serde_json::from_str(
            r#"{"title":"t","keywords":["a","b"],"canonicalLink":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(seo.canonical_link.as_deref(), Some("https://example.com"));
        let json = serde_json::to_value(&seo).unwrap();
        assert!(json.get("canonicalLink").is_some());
        assert!(json.get("focusKeyword").is_some());
    }
}
