use argh::FromArgs;
use catdog_infernum::server::UPLOAD_FIELD;
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8000;

#[derive(FromArgs)]
/// Client for the cat vs. dog classifier
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "predict", "health" or "home"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Predict(PredictCommand),
    Health(HealthCommand),
    Home(HomeCommand),
}

#[derive(FromArgs)]
/// Classify an image
#[argh(subcommand, name = "predict")]
struct PredictCommand {
    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,
}

#[derive(FromArgs)]
/// Query the health endpoint
#[argh(subcommand, name = "health")]
struct HealthCommand {}

#[derive(FromArgs)]
/// Query the root endpoint
#[argh(subcommand, name = "home")]
struct HomeCommand {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let response = match args.command {
        ClientCommands::Predict(predict_command) => {
            let bytes = tokio::fs::read(&predict_command.image_path).await?;
            let file_name = predict_command
                .image_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));

            client
                .post(format!("http://{}/predict", addr))
                .multipart(form)
                .send()
                .await?
        }
        ClientCommands::Health(_) => client.get(format!("http://{}/health", addr)).send().await?,
        ClientCommands::Home(_) => client.get(format!("http://{}/", addr)).send().await?,
    };

    let status = response.status();
    let result = response.json::<serde_json::Value>().await?;
    println!("Status: {}", status);
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
