//! Complete a small batch of prompts against an Azure OpenAI deployment.
//!
//! Configuration comes from the environment (or a `.env` file):
//!
//! ```bash
//! export AZURE_OPENAI_ENDPOINT=https://my-resource.openai.azure.com/
//! export AZURE_OPENAI_API_KEY=your_api_key_here
//! export AZURE_OPENAI_DEPLOYMENT=gpt-35-turbo-4k-0613
//! export LLM_MODEL=gpt-35-turbo
//! RUST_LOG=batch_llm=debug cargo run --example batch_generate
//! ```

use batch_llm::{BatchOptions, Error, GeneratorConfig, GeneratorFactory, RetryPolicy};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("batch_llm=info")),
        )
        .init();

    let mut config = GeneratorConfig::from_env()?;
    config.generation.show_prompts = true;
    config.generation.show_responses = true;

    let generator = GeneratorFactory::create(&config)?;

    let prompts = vec![
        "Tell me a bio of Ada Lovelace.".to_string(),
        "Tell me a bio of Alan Turing.".to_string(),
        "Tell me a bio of Grace Hopper.".to_string(),
    ];

    // Keep retries short for an interactive run.
    let options = BatchOptions::new().with_max_tokens(256).with_retry(
        RetryPolicy::default()
            .with_max_attempts(3)
            .with_timeout(Duration::from_secs(30))
            .with_retry_delay(Duration::from_secs(2)),
    );

    let results = generator.generate_batched_blocking(&prompts, &options)?;

    for (prompt, result) in prompts.iter().zip(&results) {
        if result.is_empty() {
            println!("{prompt}\n  -> failed to generate\n");
        } else {
            println!("{prompt}\n  -> {result}\n");
        }
    }

    Ok(())
}
