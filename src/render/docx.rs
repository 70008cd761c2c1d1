//! Flow-layout docx writer.
//!
//! Builds the OOXML parts as strings (pure, testable without unzipping) and
//! packs them into the `.docx` zip container in one shot — the output file is
//! written only after the whole package is assembled in memory.
//!
//! No pagination here: the consuming viewer reflows. Section order and
//! skip-if-empty policy match the paginated engine.

use std::io::Write;
use std::path::Path;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Minimal style set: two heading levels plus the hyperlink character style.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:pPr><w:spacing w:before="120" w:after="40"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:pPr><w:spacing w:before="120" w:after="40"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style></w:styles>"#;

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const STYLES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Horizontal rule: an empty paragraph carrying a bottom border.
const HR_PARAGRAPH: &str = r#"<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="4" w:space="1" w:color="auto"/></w:pBdr></w:pPr></w:p>"#;

struct Rel {
    id: String,
    rel_type: &'static str,
    target: String,
    external: bool,
}

/// Relationship table for `word/_rels/document.xml.rels`.
/// Seeded with the styles part; hyperlink targets are appended as the
/// document body is built.
pub struct Relationships {
    rels: Vec<Rel>,
}

impl Relationships {
    fn new() -> Self {
        Self {
            rels: vec![Rel {
                id: "rId1".to_string(),
                rel_type: STYLES_REL_TYPE,
                target: "styles.xml".to_string(),
                external: false,
            }],
        }
    }

    /// Registers an external hyperlink target and returns its relationship id.
    fn add_hyperlink(&mut self, target: &str) -> String {
        let id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Rel {
            id: id.clone(),
            rel_type: HYPERLINK_REL_TYPE,
            target: target.to_string(),
            external: true,
        });
        id
    }
}

fn esc(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn esc_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// A styled text run. `half_points` is the font size in half-points
/// (OOXML convention: 10pt = 20).
fn run(text: &str, bold: bool, italic: bool, half_points: Option<u32>) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if italic {
        props.push_str("<w:i/>");
    }
    if let Some(sz) = half_points {
        props.push_str(&format!("<w:sz w:val=\"{sz}\"/>"));
    }
    let r_pr = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(
        "<w:r>{r_pr}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        esc(text)
    )
}

fn hyperlink_run(rid: &str, text: &str) -> String {
    format!(
        "<w:hyperlink r:id=\"{rid}\"><w:r><w:rPr><w:rStyle w:val=\"Hyperlink\"/></w:rPr><w:t>{}</w:t></w:r></w:hyperlink>",
        esc(text)
    )
}

fn heading(text: &str, level: u8) -> String {
    format!(
        "<w:p><w:pPr><w:pStyle w:val=\"Heading{level}\"/></w:pPr>{}</w:p>",
        run(text, false, false, None)
    )
}

fn paragraph(p_pr: &str, runs: &str) -> String {
    if p_pr.is_empty() {
        format!("<w:p>{runs}</w:p>")
    } else {
        format!("<w:p><w:pPr>{p_pr}</w:pPr>{runs}</w:p>")
    }
}

/// Builds `word/document.xml`, registering hyperlink relationships as it goes.
pub fn build_document_xml(doc: &ResumeDocument, rels: &mut Relationships) -> String {
    let mut body = String::new();

    // Header: centered name, then the contact line with hyperlinks.
    body.push_str(&paragraph(
        "<w:jc w:val=\"center\"/><w:spacing w:after=\"40\"/>",
        &run(&doc.header.name, true, false, Some(32)),
    ));

    let linkedin_rid = rels.add_hyperlink(&doc.header.contact.linkedin);
    let email_rid = rels.add_hyperlink(&format!("mailto:{}", doc.header.contact.email));
    let contact_runs = format!(
        "{}{}{}{}{}",
        run("P: ", true, false, None),
        run(&format!("{}    ", doc.header.contact.phone), false, false, None),
        hyperlink_run(&linkedin_rid, "LinkedIn"),
        run("    ", false, false, None),
        hyperlink_run(&email_rid, "Email"),
    );
    body.push_str(&paragraph(
        "<w:jc w:val=\"center\"/><w:spacing w:after=\"40\"/>",
        &contact_runs,
    ));
    body.push_str(HR_PARAGRAPH);

    if !doc.summary.is_empty() {
        body.push_str(&heading("Summary", 2));
        body.push_str(&paragraph(
            "<w:spacing w:after=\"120\"/>",
            &run(&doc.summary, false, false, Some(22)),
        ));
        body.push_str(HR_PARAGRAPH);
    }

    if !doc.education.is_empty() {
        body.push_str(&heading("Education", 2));
        for edu in &doc.education {
            let runs = format!(
                "{}{}{}",
                run(
                    &format!("{} - {} | ", edu.degree, edu.university),
                    true,
                    false,
                    None
                ),
                run(&format!("GPA: {} ", edu.gpa_display()), false, true, None),
                run(&format!("({})", edu.graduation_display()), false, false, None),
            );
            body.push_str(&paragraph("<w:spacing w:after=\"40\"/>", &runs));
        }
        body.push_str(HR_PARAGRAPH);
    }

    if !doc.skills.skills.is_empty() {
        body.push_str(&heading("Technical Skills", 2));
        for (category, skills) in &doc.skills.skills {
            let runs = format!(
                "{}{}",
                run(&format!("{category}: "), true, false, Some(20)),
                run(&skills.join(", "), false, false, Some(20)),
            );
            body.push_str(&paragraph("<w:spacing w:after=\"20\"/>", &runs));
        }
        body.push_str(HR_PARAGRAPH);
    }

    if !doc.experience.is_empty() {
        body.push_str(&heading("Work Experience", 2));
        for exp in &doc.experience {
            let runs = format!(
                "{}{}",
                run(
                    &format!("{} - {} | ", exp.title, exp.company),
                    true,
                    false,
                    None
                ),
                run(&format!("({})", exp.duration), false, true, None),
            );
            body.push_str(&paragraph("<w:spacing w:after=\"40\"/>", &runs));
            for resp in &exp.responsibilities {
                body.push_str(&paragraph(
                    "<w:ind w:left=\"360\"/><w:spacing w:after=\"20\"/>",
                    &run(&format!("- {resp}"), false, false, Some(20)),
                ));
            }
        }
        body.push_str(HR_PARAGRAPH);
    }

    if !doc.projects.is_empty() {
        body.push_str(&heading("Project Experience", 2));
        for project in &doc.projects {
            let runs = format!(
                "{}{}",
                run(&format!("{}: ", project.name), true, false, Some(22)),
                run(&project.description, false, false, Some(20)),
            );
            body.push_str(&paragraph("<w:spacing w:after=\"40\"/>", &runs));
        }
        body.push_str(HR_PARAGRAPH);
    }

    // US letter with 1" margins, in twentieths of a point.
    body.push_str(
        "<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\"/></w:sectPr>",
    );

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <w:body>{body}</w:body></w:document>"
    )
}

pub fn build_rels_xml(rels: &Relationships) -> String {
    let mut entries = String::new();
    for rel in &rels.rels {
        let mode = if rel.external {
            " TargetMode=\"External\""
        } else {
            ""
        };
        entries.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"{mode}/>",
            rel.id,
            rel.rel_type,
            esc_attr(&rel.target),
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{entries}</Relationships>"
    )
}

/// Packs the parts into the docx zip container, in memory.
fn pack(document_xml: &str, rels_xml: &str) -> Result<Vec<u8>, AppError> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("word/styles.xml", STYLES_XML),
        ("word/document.xml", document_xml),
        ("word/_rels/document.xml.rels", rels_xml),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

/// Renders the document to a `.docx` file at `path`.
pub fn write_docx(doc: &ResumeDocument, path: &Path) -> Result<(), AppError> {
    if doc.header.contact.linkedin.is_empty() || doc.header.contact.email.is_empty() {
        return Err(AppError::Skeleton(
            "contact hyperlink targets (linkedin, email) must not be empty".to_string(),
        ));
    }

    let mut rels = Relationships::new();
    let document_xml = build_document_xml(doc, &mut rels);
    let rels_xml = build_rels_xml(&rels);
    let bytes = pack(&document_xml, &rels_xml)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Contact, Education, Header, Project, SkillsSection};

    fn base_doc() -> ResumeDocument {
        ResumeDocument {
            header: Header {
                name: "Ada Lovelace".to_string(),
                contact: Contact {
                    phone: "555-0100".to_string(),
                    linkedin: "https://linkedin.com/in/ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
            },
            summary: "Analytical engine programmer.".to_string(),
            education: vec![Education {
                degree: "BSc Mathematics".to_string(),
                university: "University of London".to_string(),
                gpa: None,
                graduation_date: Some("1840".to_string()),
            }],
            skills: SkillsSection::default(),
            experience: vec![],
            projects: vec![Project {
                name: "Notes".to_string(),
                description: "Annotated translation & commentary.".to_string(),
            }],
        }
    }

    #[test]
    fn test_document_xml_contains_header_and_sections_in_order() {
        let doc = base_doc();
        let mut rels = Relationships::new();
        let xml = build_document_xml(&doc, &mut rels);

        let name_at = xml.find("Ada Lovelace").expect("name missing");
        let summary_at = xml.find("Summary").expect("summary heading missing");
        let education_at = xml.find("Education").expect("education heading missing");
        let projects_at = xml.find("Project Experience").expect("projects heading missing");
        assert!(name_at < summary_at && summary_at < education_at && education_at < projects_at);
    }

    #[test]
    fn test_missing_gpa_renders_na() {
        let doc = base_doc();
        let mut rels = Relationships::new();
        let xml = build_document_xml(&doc, &mut rels);
        assert!(xml.contains("GPA: N/A"));
        assert!(xml.contains("(1840)"));
    }

    #[test]
    fn test_empty_skills_section_skipped() {
        let doc = base_doc();
        let mut rels = Relationships::new();
        let xml = build_document_xml(&doc, &mut rels);
        assert!(!xml.contains("Technical Skills"));
    }

    #[test]
    fn test_hyperlink_rel_ids_match_document_references() {
        let doc = base_doc();
        let mut rels = Relationships::new();
        let xml = build_document_xml(&doc, &mut rels);
        let rels_xml = build_rels_xml(&rels);

        for rid in ["rId2", "rId3"] {
            assert!(xml.contains(&format!("r:id=\"{rid}\"")), "{rid} missing in document");
            assert!(rels_xml.contains(&format!("Id=\"{rid}\"")), "{rid} missing in rels");
        }
        assert!(rels_xml.contains("Target=\"https://linkedin.com/in/ada\" TargetMode=\"External\""));
        assert!(rels_xml.contains("Target=\"mailto:ada@example.com\" TargetMode=\"External\""));
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let mut doc = base_doc();
        doc.summary = "Engines & <gears>".to_string();
        let mut rels = Relationships::new();
        let xml = build_document_xml(&doc, &mut rels);
        assert!(xml.contains("Engines &amp; &lt;gears&gt;"));
        assert!(!xml.contains("Engines & <gears>"));
    }

    #[test]
    fn test_write_docx_produces_zip_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        write_docx(&base_doc(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK", "docx must be a zip container");
    }

    #[test]
    fn test_write_docx_rejects_empty_link_target() {
        let mut doc = base_doc();
        doc.header.contact.email.clear();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        let err = write_docx(&doc, &path).unwrap_err();
        assert!(matches!(err, AppError::Skeleton(_)));
        assert!(!path.exists());
    }
}
