#[tokio::main]
async fn main() -> padbot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("padbot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting padbot Discord bot");

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("A rustls crypto provider was already installed");
    }

    match padbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
