use anyhow::Result;
use deskmate_api::{build_app, Settings};
use deskmate_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("deskmate_api");

    let settings = Settings::from_env();
    let app = build_app(&settings)?;

    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    tracing::info!(
        bind = %settings.bind,
        upload_dir = %settings.upload_dir.display(),
        "deskmate api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
