//! Skills Enhancement Client.
//!
//! One attempt = call the model, locate the fenced YAML block, decode it.
//! Any failure along that path counts against `max_retries`; after exhaustion
//! the enhancer returns the empty `{"Skills": {}}` fallback. Failure never
//! crosses this boundary.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::models::SkillsSection;

pub mod prompts;

use prompts::{build_enhance_prompt, ENHANCE_SYSTEM};

/// Seam over the text-generation service so the retry/fallback policy can be
/// tested without a network.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl CompletionApi for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

pub struct SkillsEnhancer<C = LlmClient> {
    api: C,
    max_retries: u32,
    retry_delay: Duration,
}

impl<C: CompletionApi> SkillsEnhancer<C> {
    pub fn new(api: C, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            api,
            max_retries,
            retry_delay,
        }
    }

    /// Enhances the current skills against a job description.
    ///
    /// Retries up to `max_retries` attempts with a fixed delay between them
    /// (`max_retries - 1` delays on total failure), then falls back to
    /// `SkillsSection::default()`.
    pub async fn enhance(&self, job_description: &str, current: &SkillsSection) -> SkillsSection {
        let current_yaml = serde_yaml::to_string(current).unwrap_or_default();
        let prompt = build_enhance_prompt(&current_yaml, job_description);

        for attempt in 1..=self.max_retries {
            match self.attempt(&prompt).await {
                Ok(section) => {
                    info!(
                        attempt,
                        categories = section.skills.len(),
                        "skills enhancement succeeded"
                    );
                    return section;
                }
                Err(reason) => {
                    warn!("skills enhancement attempt {attempt} failed: {reason}");
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "all {} enhancement attempts failed, proceeding with empty skills",
            self.max_retries
        );
        SkillsSection::default()
    }

    async fn attempt(&self, prompt: &str) -> Result<SkillsSection, String> {
        let text = self
            .api
            .complete(prompt, ENHANCE_SYSTEM)
            .await
            .map_err(|e| e.to_string())?;
        let block = extract_yaml_block(&text)
            .ok_or_else(|| "response contains no fenced yaml block".to_string())?;
        serde_yaml::from_str(block).map_err(|e| format!("yaml decode failed: {e}"))
    }
}

/// Locates the first fenced ```yaml block and returns its trimmed body.
///
/// Deliberately narrow: a delimiter scan, nothing more. Isolated from the
/// network call so it can be exercised against malformed inputs directly.
pub fn extract_yaml_block(text: &str) -> Option<&str> {
    let start = text.find("```yaml")?;
    let rest = &text[start + "```yaml".len()..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ── extract_yaml_block ──────────────────────────────────────────────────

    #[test]
    fn test_extract_yaml_block_well_formed() {
        let text = "Here you go:\n```yaml\nSkills:\n  Languages: [Rust]\n```\nEnjoy!";
        assert_eq!(
            extract_yaml_block(text),
            Some("Skills:\n  Languages: [Rust]")
        );
    }

    #[test]
    fn test_extract_yaml_block_missing_fence() {
        assert_eq!(extract_yaml_block("Skills:\n  Languages: [Rust]"), None);
    }

    #[test]
    fn test_extract_yaml_block_unterminated_fence() {
        assert_eq!(extract_yaml_block("```yaml\nSkills: {}"), None);
    }

    #[test]
    fn test_extract_yaml_block_plain_fence_is_not_yaml() {
        assert_eq!(extract_yaml_block("```\nSkills: {}\n```"), None);
    }

    #[test]
    fn test_extract_yaml_block_empty_body() {
        assert_eq!(extract_yaml_block("```yaml\n```"), Some(""));
    }

    #[test]
    fn test_extract_yaml_block_takes_first_of_many() {
        let text = "```yaml\nfirst: 1\n```\n```yaml\nsecond: 2\n```";
        assert_eq!(extract_yaml_block(text), Some("first: 1"));
    }

    // ── retry / fallback policy ─────────────────────────────────────────────

    struct FailingApi {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl CompletionApi for FailingApi {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::EmptyContent)
        }
    }

    struct CannedApi {
        body: String,
    }

    #[async_trait]
    impl CompletionApi for CannedApi {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self.body.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_service_falls_back_after_max_retries() {
        let api = FailingApi {
            attempts: AtomicU32::new(0),
        };
        let enhancer = SkillsEnhancer::new(api, 3, Duration::from_secs(2));

        let result = enhancer.enhance("any jd", &SkillsSection::default()).await;

        assert_eq!(result, SkillsSection::default());
        assert_eq!(enhancer.api.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_yaml_counts_as_failed_attempt() {
        let api = CannedApi {
            body: "```yaml\n: not yaml at all ::\n```".to_string(),
        };
        let enhancer = SkillsEnhancer::new(api, 1, Duration::from_millis(1));

        let result = enhancer.enhance("jd", &SkillsSection::default()).await;
        assert!(result.skills.is_empty());
    }

    #[tokio::test]
    async fn test_successful_response_parses_and_preserves_order() {
        let api = CannedApi {
            body: "Sure:\n```yaml\nSkills:\n  Zeta:\n    - one\n  Alpha:\n    - two\n```"
                .to_string(),
        };
        let enhancer = SkillsEnhancer::new(api, 3, Duration::from_millis(1));

        let result = enhancer.enhance("jd", &SkillsSection::default()).await;
        let categories: Vec<&String> = result.skills.keys().collect();
        assert_eq!(categories, ["Zeta", "Alpha"]);
    }
}
