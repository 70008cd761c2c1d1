// All LLM prompt constants for the skills-enhancement module.

/// System prompt for skills enhancement — enforces a single fenced YAML block.
pub const ENHANCE_SYSTEM: &str = "You are an expert resume writer and job-market analyst. \
    Restructure and extend a categorized skills list against a job description. \
    You MUST respond with exactly one YAML document inside a fenced ```yaml code block. \
    Do NOT include any other code blocks. \
    Do NOT include explanations outside the block.";

/// Enhancement prompt template. Replace `{current_skills}` and
/// `{job_description}` before sending.
pub const ENHANCE_PROMPT_TEMPLATE: &str = r#"Below is a list of skills grouped by categories. Restructure this list into
a similar format, add any relevant missing skills, and ensure proper organization.

Current Skills:
{current_skills}

Based on the following job description, extract the key technical and soft skills:

{job_description}

Return YAML inside a fenced ```yaml code block with this shape:

```yaml
Skills:
  Programming Languages:
    - Rust
  AI/ML Frameworks:
    - PyTorch
```

Rules:
- Keep a single top-level `Skills` key.
- Use categories like Programming Languages, AI/ML Frameworks, AI Techniques.
- Include every original skill plus the additional ones; de-duplicate entries.
"#;

/// Fills the enhancement template.
pub fn build_enhance_prompt(current_skills_yaml: &str, job_description: &str) -> String {
    ENHANCE_PROMPT_TEMPLATE
        .replace("{current_skills}", current_skills_yaml)
        .replace("{job_description}", job_description)
}
