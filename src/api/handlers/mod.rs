pub mod case_studies;
pub mod health;
