use ferrum_stream::framework::cli;
use tracing::info;

/// Streaming job binary: `ferrum-stream --mode map --type WordCountMapper`
fn main() -> anyhow::Result<()> {
    let registry = demos::registry();
    let summary = cli::run(&registry)?;

    info!(
        records_read = summary.records_read,
        records_emitted = summary.records_emitted,
        records_dropped = summary.records_dropped,
        "job finished"
    );
    Ok(())
}
