pub use super::case_studies::Entity as CaseStudies;
