use bill_extract::config::{Config, LlmBackend, LlmSection};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let mut args = std::env::args().skip(1);
    let pdf_path = args
        .next()
        .ok_or("Usage: bill_extract <bill.pdf> [config.toml]")?;
    let config_path = args
        .next()
        .unwrap_or_else(|| ".config/bill_extract.toml".to_string());

    let llm = match Config::load(&config_path) {
        Ok(cfg) => cfg.llm,
        Err(e) => {
            warn!(path = %config_path, error = %e, "No usable config — using heuristics backend");
            LlmSection::default()
        }
    };

    info!(path = %pdf_path, backend = ?llm.backend, "Extracting bill");
    let pdf_bytes = std::fs::read(&pdf_path)?;

    let mut record = bill_extract::extract_bill_from_pdf(&pdf_bytes, &llm).await;

    // Retry policy belongs to the caller: on a model-path failure, rerun
    // the pattern rules before giving up.
    if record.is_error() && llm.backend != LlmBackend::Heuristics {
        if let Ok(doc) = bill_extract::pdf::read_document(&pdf_bytes) {
            warn!(error = ?record.error, "Model extraction failed — falling back to pattern rules");
            record = bill_extract::extract_with_rules(&doc);
        }
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
