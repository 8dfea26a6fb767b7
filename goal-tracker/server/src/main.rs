#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = goal_tracker_server::config::Config::from_env()?;
    goal_tracker_server::web::start_web_server(config).await
}
