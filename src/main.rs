mod config;
mod enhance;
mod errors;
mod layout;
mod llm_client;
mod models;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::enhance::SkillsEnhancer;
use crate::layout::{render_document, Geometry};
use crate::llm_client::LlmClient;
use crate::models::{merge, ResumeDocument};
use crate::render::pdf::PdfSink;

/// Tailor a resume skeleton to a job description and render it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Job description text to tailor the skills section against
    #[arg(short = 'j', long)]
    job_description: String,

    /// Path of the .docx file to write
    #[arg(short = 'o', long, default_value = "enhanced_resume.docx")]
    output: PathBuf,

    /// Also render a paginated .pdf next to the .docx
    #[arg(long)]
    pdf: bool,

    /// Path of the resume skeleton YAML
    #[arg(short = 's', long, default_value = "resume_skeleton.yaml")]
    skeleton: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting retailor v{}", env!("CARGO_PKG_VERSION"));

    let skeleton = ResumeDocument::from_yaml_file(&args.skeleton)?;
    info!(path = %args.skeleton.display(), "Resume skeleton loaded");

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let enhancer = SkillsEnhancer::new(
        llm,
        config.max_retries,
        Duration::from_secs(config.retry_delay_secs),
    );
    let enhanced = enhancer
        .enhance(&args.job_description, &skeleton.skills)
        .await;
    info!(categories = enhanced.skills.len(), "Skills section enhanced");

    let resume = merge(skeleton, enhanced);

    render::docx::write_docx(&resume, &args.output)?;
    info!(path = %args.output.display(), "Wrote docx");

    if args.pdf {
        let pdf_path = args.output.with_extension("pdf");
        let geom = Geometry::default();
        let mut sink = PdfSink::new(geom);
        render_document(&resume, &mut sink, geom)?;
        let pages = sink.page_count();
        sink.finish(&pdf_path)?;
        info!(path = %pdf_path.display(), pages, "Wrote pdf");
    }

    Ok(())
}
