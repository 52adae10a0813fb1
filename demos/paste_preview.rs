use clap::Parser;
use link_preview_block::{
    log_block_card, log_error_card, setup_logging, Block, BlockConfig, BlockParams,
    FetchOutcome, LinkPreviewBlock, LogConfig, TracingHost,
};
use std::sync::Arc;

/// Pastes URLs into a link preview block and prints the rendered markup.
#[derive(Parser, Debug)]
struct Args {
    /// Metadata endpoint, queried as `<endpoint>?url=<link>`
    #[arg(long)]
    endpoint: String,

    /// Treat the block as read-only
    #[arg(long)]
    read_only: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_logging(LogConfig {
        log_level: args.log_level.clone(),
        file_output: false,
        ..LogConfig::default()
    })?;

    let params = BlockParams::new(BlockConfig::new(&args.endpoint), Arc::new(TracingHost))
        .with_read_only(args.read_only);
    let block = LinkPreviewBlock::with_fetcher(params)?;

    for url in &args.urls {
        match block.handle_paste(url).await {
            FetchOutcome::Failed(failure) => log_error_card(url, &failure),
            FetchOutcome::Unclaimed => println!("Not a link, ignored: {url}"),
            outcome => tracing::debug!(?outcome, url = %url, "Paste handled"),
        }
        println!("{}", block.render_html());
    }

    if block.validate() {
        log_block_card(&block.save());
        println!("{}", serde_json::to_string_pretty(&block.save())?);
    } else {
        println!("Block is empty and would be dropped by the host");
    }

    Ok(())
}
