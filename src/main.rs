use anyhow::Result;
use repo2html::cli::{init_logging, parse_args};
use repo2html::run_repo2html;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = parse_args()?;
    init_logging(config.verbosity);

    #[cfg(feature = "restore")]
    if let Some(input) = &config.restore_input {
        repo2html::restore_from_file(input, config.restore_path.as_deref()).await?;
        return Ok(());
    }

    run_repo2html(config).await?;
    Ok(())
}
