//! Gemini Background Removal CLI Tool
//!
//! Command-line interface for removing image backgrounds with the
//! gemini-bgremove library.

#[cfg(feature = "cli")]
use gemini_bgremove::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
