/// Business logic layer
pub mod content;
pub mod selection;
pub mod targeting_groups;

pub use content::ContentService;
pub use selection::AdSelectionService;
pub use targeting_groups::TargetingGroupService;
