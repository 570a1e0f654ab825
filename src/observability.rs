use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber for the embedding process.
///
/// Call once at startup; a second call fails because a global subscriber is
/// already set.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
