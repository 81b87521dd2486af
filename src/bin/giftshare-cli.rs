use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "giftshare-cli")]
#[command(about = "Command-line client for the gift-sharing API", long_about = None)]
struct Cli {
    /// Server root, without the API base path.
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Prefix the API routes are mounted under.
    #[arg(short, long, default_value = "/api")]
    base_path: String,

    /// ID token sent as `Authorization: Bearer <token>`.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,
    /// List available items
    Items {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one item
    Item { id: String },
    /// List the caller's own items
    MyItems,
    /// Claim an item
    Claim { id: String },
    /// Show the caller's profile, creating it if needed
    Profile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let root = cli.url.trim_end_matches('/');
    let api = format!("{}{}", root, cli.base_path);
    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", root)),
        Commands::Items { category } => {
            let request = client.get(format!("{}/items", api));
            match category {
                Some(category) => request.query(&[("category", category)]),
                None => request,
            }
        }
        Commands::Item { id } => client.get(format!("{}/items/{}", api, id)),
        Commands::MyItems => client.get(format!("{}/items/user", api)),
        Commands::Claim { id } => client.post(format!("{}/items/{}/claim", api, id)),
        Commands::Profile => client.post(format!("{}/users/profile", api)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
