use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    brainbot::cli::run_cli().await
}
