//! Well-known stage identifiers of the standard workflow.
//!
//! The aggregator and the action stages locate their upstream results by
//! these ids, so they live in one place.

use sentio_contracts::{analysis::Department, stage::StageId};

pub const SENTIMENT: &str = "sentiment-classifier";
pub const THEMES: &str = "theme-extractor";

/// Id of the sentiment classification stage.
pub fn sentiment() -> StageId {
    StageId::new(SENTIMENT)
}

/// Id of the theme extraction stage.
pub fn themes() -> StageId {
    StageId::new(THEMES)
}

/// Id of the action generation stage for one department.
pub fn action_generator(department: Department) -> StageId {
    StageId::new(format!("{}-action-generator", department.slug()))
}
