pub mod case_study_service;
pub mod image_store;
