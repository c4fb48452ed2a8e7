pub mod prelude;

pub mod case_studies;
