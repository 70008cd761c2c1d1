pub mod resume;

pub use resume::{merge, ResumeDocument, SkillsMap, SkillsSection};
