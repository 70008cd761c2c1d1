//! Paginated layout engine.
//!
//! Renders a [`ResumeDocument`] onto a sequence of fixed-size pages through a
//! [`PageSink`]: greedy word-wrap against measured text widths, a decreasing
//! vertical cursor, and a page break whenever the next line would cross the
//! bottom margin. The name/contact header is drawn on the first page only —
//! continuation pages start with a blank header region.

use tracing::debug;

use crate::errors::AppError;
use crate::layout::font_metrics::{Font, Geometry};
use crate::models::resume::{Contact, ResumeDocument};

/// Extra clearance required below a line before the bottom margin.
const BREAK_PAD: f32 = 10.0;
/// Vertical advance after a line is `size + LINE_PAD`.
const LINE_PAD: f32 = 2.0;
/// Fixed cursor decrement after a horizontal rule.
const RULE_ADVANCE: f32 = 20.0;

const NAME_SIZE: f32 = 16.0;
const NAME_ADVANCE: f32 = 30.0;
const CONTACT_ADVANCE: f32 = 15.0;
const HEADING_SIZE: f32 = 12.0;
const SUMMARY_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const BULLET_INDENT: f32 = 10.0;

pub type SinkResult = Result<(), AppError>;

/// Abstract fixed-size drawing target.
///
/// Coordinates are in points with the origin at the bottom-left of the page.
/// Any error from a sink is a contract violation: fatal, propagated
/// immediately, never retried.
pub trait PageSink {
    /// Finalizes the current page (if any) and opens a fresh one.
    fn begin_page(&mut self) -> SinkResult;

    fn draw_text(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32) -> SinkResult;

    fn draw_rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> SinkResult;

    /// Draws `text` styled as a hyperlink and registers the clickable region
    /// over it, targeting `uri`.
    fn draw_link(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32, uri: &str)
        -> SinkResult;

    /// Measured width of `text` in points. Pure — identical inputs always
    /// measure identically.
    fn measure(&self, text: &str, font: Font, size: f32) -> f32 {
        font.metrics().measure_str(text, size)
    }
}

/// Greedy word-wrap: accumulate words while the measured candidate line still
/// fits `max_width`; close the line when the next word would exceed it.
///
/// A single word wider than `max_width` is placed on its own line, never
/// split mid-word. Wrap decisions are a pure function of
/// (text, font, size, max_width).
pub fn wrap_lines(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let metrics = font.metrics();
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || metrics.measure_str(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Owns the sink plus the ephemeral per-render layout state: the vertical
/// cursor, the page index, and the first-page flag that suppresses header
/// redraw on continuation pages.
pub struct PageRenderer<'a, S: PageSink> {
    sink: &'a mut S,
    geom: Geometry,
    cursor_y: f32,
    page_index: usize,
    first_page: bool,
}

impl<'a, S: PageSink> PageRenderer<'a, S> {
    pub fn new(sink: &'a mut S, geom: Geometry) -> Result<Self, AppError> {
        sink.begin_page()?;
        Ok(Self {
            sink,
            geom,
            cursor_y: geom.page_height - geom.margin,
            page_index: 0,
            first_page: true,
        })
    }

    /// Renders the full document in the fixed section order.
    pub fn render(&mut self, doc: &ResumeDocument) -> Result<(), AppError> {
        if self.first_page {
            self.header(doc)?;
        }

        if !doc.summary.is_empty() {
            self.text_block(Some("Summary"), &doc.summary, Font::Helvetica, SUMMARY_SIZE, 0.0)?;
            self.rule()?;
        }

        if !doc.education.is_empty() {
            self.heading("Education")?;
            for edu in &doc.education {
                let line = format!("{} - {}", edu.degree, edu.university);
                self.text_block(None, &line, Font::HelveticaBold, BODY_SIZE, 0.0)?;
                let detail = format!("GPA: {} ({})", edu.gpa_display(), edu.graduation_display());
                self.text_block(None, &detail, Font::Helvetica, BODY_SIZE, 0.0)?;
            }
            self.rule()?;
        }

        if !doc.skills.skills.is_empty() {
            self.heading("Technical Skills")?;
            for (category, skills) in &doc.skills.skills {
                self.text_block(Some(category), &skills.join(", "), Font::Helvetica, BODY_SIZE, 0.0)?;
            }
            self.rule()?;
        }

        if !doc.experience.is_empty() {
            self.heading("Work Experience")?;
            for exp in &doc.experience {
                let line = format!("{} - {} ({})", exp.title, exp.company, exp.duration);
                self.text_block(None, &line, Font::HelveticaBold, BODY_SIZE, 0.0)?;
                for resp in &exp.responsibilities {
                    self.text_block(None, &format!("- {resp}"), Font::Helvetica, BODY_SIZE, BULLET_INDENT)?;
                }
            }
            self.rule()?;
        }

        if !doc.projects.is_empty() {
            self.heading("Project Experience")?;
            for project in &doc.projects {
                self.text_block(Some(&project.name), &project.description, Font::Helvetica, BODY_SIZE, 0.0)?;
            }
            self.rule()?;
        }

        Ok(())
    }

    /// Centered name plus the contact line with hyperlink regions.
    /// Drawn on page 1 only.
    fn header(&mut self, doc: &ResumeDocument) -> SinkResult {
        let contact = &doc.header.contact;
        if contact.linkedin.is_empty() || contact.email.is_empty() {
            return Err(AppError::Skeleton(
                "contact hyperlink targets (linkedin, email) must not be empty".to_string(),
            ));
        }

        let name_width = self.sink.measure(&doc.header.name, Font::HelveticaBold, NAME_SIZE);
        let x = (self.geom.page_width - name_width) / 2.0;
        self.sink
            .draw_text(x, self.cursor_y, &doc.header.name, Font::HelveticaBold, NAME_SIZE)?;
        self.cursor_y -= NAME_ADVANCE;

        self.contact_line(contact)?;
        self.rule()
    }

    /// `P: <phone> | LinkedIn | Email`, centered, with clickable regions over
    /// the LinkedIn and Email segments.
    fn contact_line(&mut self, contact: &Contact) -> SinkResult {
        let font = Font::Helvetica;
        let mailto = format!("mailto:{}", contact.email);
        let phone = format!("P: {}", contact.phone);
        let segments: [(&str, Option<&str>); 5] = [
            (&phone, None),
            (" | ", None),
            ("LinkedIn", Some(&contact.linkedin)),
            (" | ", None),
            ("Email", Some(&mailto)),
        ];

        let total: f32 = segments
            .iter()
            .map(|(text, _)| self.sink.measure(text, font, BODY_SIZE))
            .sum();
        let mut x = (self.geom.page_width - total) / 2.0;

        for (text, link) in segments {
            match link {
                Some(uri) => self.sink.draw_link(x, self.cursor_y, text, font, BODY_SIZE, uri)?,
                None => self.sink.draw_text(x, self.cursor_y, text, font, BODY_SIZE)?,
            }
            x += self.sink.measure(text, font, BODY_SIZE);
        }
        self.cursor_y -= CONTACT_ADVANCE;
        Ok(())
    }

    /// Section heading: one bold line. Content and trailing rule are the
    /// caller's business.
    fn heading(&mut self, text: &str) -> SinkResult {
        self.ensure_line_space(HEADING_SIZE)?;
        self.sink
            .draw_text(self.geom.margin, self.cursor_y, text, Font::HelveticaBold, HEADING_SIZE)?;
        self.cursor_y -= HEADING_SIZE + LINE_PAD;
        Ok(())
    }

    /// Full-width horizontal rule at the current cursor, then a fixed
    /// decrement. No page-break check of its own: the preceding content
    /// already claimed the space.
    fn rule(&mut self) -> SinkResult {
        self.sink.draw_rule(
            self.geom.margin,
            self.cursor_y,
            self.geom.page_width - self.geom.margin,
            self.cursor_y,
        )?;
        self.cursor_y -= RULE_ADVANCE;
        Ok(())
    }

    /// Wrapped text block, optionally with a bold `label:` prefix.
    ///
    /// Wrapping is computed against the full combined string; only the draw
    /// step splits the style runs. The page-break condition is re-checked for
    /// each produced line, so a block may span a page boundary. A labelled
    /// block with empty body still consumes one line-advance.
    fn text_block(
        &mut self,
        label: Option<&str>,
        text: &str,
        font: Font,
        size: f32,
        indent: f32,
    ) -> SinkResult {
        let full = match label {
            Some(l) => format!("{l}: {text}"),
            None => text.to_string(),
        };
        let max_width = self.geom.printable_width() - indent;
        let lines = wrap_lines(&full, font, size, max_width);

        let x = self.geom.margin + indent;
        for (i, line) in lines.iter().enumerate() {
            self.ensure_line_space(size)?;
            let mut drawn = false;
            if i == 0 {
                if let Some(l) = label {
                    let marker = format!("{l}:");
                    if let Some(rest) = line.strip_prefix(marker.as_str()) {
                        let bold = format!("{marker} ");
                        let prefix_width = self.sink.measure(&bold, Font::HelveticaBold, size);
                        self.sink
                            .draw_text(x, self.cursor_y, &bold, Font::HelveticaBold, size)?;
                        let rest = rest.trim_start();
                        if !rest.is_empty() {
                            self.sink
                                .draw_text(x + prefix_width, self.cursor_y, rest, font, size)?;
                        }
                        drawn = true;
                    }
                }
            }
            if !drawn {
                self.sink.draw_text(x, self.cursor_y, line, font, size)?;
            }
            self.cursor_y -= size + LINE_PAD;
        }
        Ok(())
    }

    /// Page-break check, run before every drawn line: if the line would cross
    /// the bottom margin, finalize the page and reset the cursor to the top
    /// of a fresh one. Continuation pages never redraw the header.
    fn ensure_line_space(&mut self, size: f32) -> SinkResult {
        if self.cursor_y - (size + BREAK_PAD) < self.geom.margin {
            self.sink.begin_page()?;
            self.page_index += 1;
            self.cursor_y = self.geom.page_height - self.geom.margin;
            self.first_page = false;
            debug!(page = self.page_index, "started continuation page");
        }
        Ok(())
    }
}

/// Renders `doc` into `sink` with the given geometry.
pub fn render_document<S: PageSink>(
    doc: &ResumeDocument,
    sink: &mut S,
    geom: Geometry,
) -> Result<(), AppError> {
    let mut renderer = PageRenderer::new(sink, geom)?;
    renderer.render(doc)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
