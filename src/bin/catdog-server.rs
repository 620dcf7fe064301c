use argh::FromArgs;
use catdog_infernum::{AppState, ModelHost, router, server::DEFAULT_MAX_UPLOAD_BYTES};
use std::path::PathBuf;

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL_PATH: &str = "model.onnx";

#[derive(FromArgs)]
/// Serves the cat vs. dog classifier over HTTP.
struct ServerArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// path to the ONNX model
    #[argh(option, short = 'm', default = "PathBuf::from(DEFAULT_MODEL_PATH)")]
    model: PathBuf,

    /// largest accepted upload, in bytes
    #[argh(option, default = "DEFAULT_MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: ServerArgs = argh::from_env();

    // a missing or broken model is logged and the server still starts
    let host = ModelHost::load(&args.model);
    log::info!("Model state: {}", host.state().as_str());

    let app = router(AppState::new(host).with_max_upload_bytes(args.max_upload_bytes));

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
