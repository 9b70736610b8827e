#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = study_tracker_server::config::Config::from_env()?;
    study_tracker_server::web::start_web_server(config).await
}
