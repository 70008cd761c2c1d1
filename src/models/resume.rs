//! Resume Data Model — the in-memory record both renderers consume.
//!
//! Built once from the YAML skeleton, mutated exactly once (skills
//! replacement via [`merge`]), then passed read-only into the renderers.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Mapping from category name to ordered skill strings.
/// Insertion order is render order, so this must stay an ordered map.
pub type SkillsMap = IndexMap<String, Vec<String>>;

/// The skills field as it appears in the skeleton and in the model's
/// response: a single top-level `Skills` key over the category map.
/// `SkillsSection::default()` is the `{"Skills": {}}` enhancement fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsSection {
    #[serde(rename = "Skills", default)]
    pub skills: SkillsMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub linkedin: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub university: String,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default)]
    pub graduation_date: Option<String>,
}

impl Education {
    pub fn gpa_display(&self) -> &str {
        self.gpa.as_deref().unwrap_or("N/A")
    }

    pub fn graduation_display(&self) -> &str {
        self.graduation_date.as_deref().unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
}

/// Root aggregate. Every list field defaults to empty when absent from the
/// skeleton — renderers never fail on a missing optional section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub header: Header,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: SkillsSection,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl ResumeDocument {
    /// Loads the resume skeleton from a YAML file.
    /// A missing or malformed required field is fatal — the skeleton is a
    /// static contract, not user input.
    pub fn from_yaml_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Skeleton(format!("cannot read skeleton {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            AppError::Skeleton(format!("malformed skeleton {}: {e}", path.display()))
        })
    }
}

/// Replaces the skeleton's skills with the enhancement output, copying every
/// other field through unchanged. Pure — no I/O, no failure modes.
pub fn merge(skeleton: ResumeDocument, enhanced: SkillsSection) -> ResumeDocument {
    ResumeDocument {
        skills: enhanced,
        ..skeleton
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKELETON_YAML: &str = r#"
header:
  name: Ada Lovelace
  contact:
    phone: "555-0100"
    linkedin: "https://linkedin.com/in/ada"
    email: "ada@example.com"
summary: Analytical engine programmer.
education:
  - degree: BSc Mathematics
    university: University of London
    gpa: "3.9"
    graduation_date: "1840"
  - degree: MSc Computation
    university: Analytical Institute
skills:
  Skills:
    Programming Languages:
      - Rust
      - Python
experience:
  - title: Engineer
    company: Babbage & Co
    duration: 1837-1842
    responsibilities:
      - Wrote the first published algorithm
projects:
  - name: Notes
    description: Annotated translation of the engine paper.
"#;

    fn parse_skeleton() -> ResumeDocument {
        serde_yaml::from_str(SKELETON_YAML).expect("skeleton fixture must parse")
    }

    #[test]
    fn test_skeleton_parses_all_sections() {
        let doc = parse_skeleton();
        assert_eq!(doc.header.name, "Ada Lovelace");
        assert_eq!(doc.education.len(), 2);
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.projects.len(), 1);
        assert_eq!(
            doc.skills.skills.get("Programming Languages"),
            Some(&vec!["Rust".to_string(), "Python".to_string()])
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let doc = parse_skeleton();
        let second = &doc.education[1];
        assert_eq!(second.gpa_display(), "N/A");
        assert_eq!(second.graduation_display(), "N/A");
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let yaml = r#"
header:
  name: Minimal
  contact:
    phone: "1"
    linkedin: "https://example.com"
    email: "m@example.com"
"#;
        let doc: ResumeDocument = serde_yaml::from_str(yaml).unwrap();
        assert!(doc.summary.is_empty());
        assert!(doc.education.is_empty());
        assert!(doc.skills.skills.is_empty());
        assert!(doc.experience.is_empty());
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let result: Result<ResumeDocument, _> = serde_yaml::from_str("summary: no header");
        assert!(result.is_err());
    }

    #[test]
    fn test_skills_category_order_survives_roundtrip() {
        let yaml = r#"
Skills:
  Zeta: [one]
  Alpha: [two]
  Mid: [three]
"#;
        let section: SkillsSection = serde_yaml::from_str(yaml).unwrap();
        let categories: Vec<&String> = section.skills.keys().collect();
        assert_eq!(categories, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_merge_replaces_only_skills() {
        let skeleton = parse_skeleton();
        let mut map = SkillsMap::new();
        map.insert("AI/ML Frameworks".to_string(), vec!["candle".to_string()]);
        let enhanced = SkillsSection { skills: map };

        let merged = merge(skeleton.clone(), enhanced.clone());
        assert_eq!(merged.skills, enhanced);
        assert_eq!(merged.header, skeleton.header);
        assert_eq!(merged.summary, skeleton.summary);
        assert_eq!(merged.education, skeleton.education);
        assert_eq!(merged.experience, skeleton.experience);
        assert_eq!(merged.projects, skeleton.projects);
    }
}
