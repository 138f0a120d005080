use chrono::Duration;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use guildhq::auth::{issue_token, Claims};

#[derive(Parser)]
#[command(name = "guildhq-cli")]
#[command(about = "Management CLI for the GuildHQ API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key for the /admin commands
    #[arg(short, long, default_value = "")]
    key: String,

    /// Bearer token for user commands
    #[arg(short, long, default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// Show the prayer scheduler and its last report
    Prayer,
    /// Start a prayer run now
    Pray,
    /// List guilds
    Guilds,
    /// Show one guild
    Guild { id: String },
    /// Found a guild as the token's user
    CreateGuild {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Issue a development token signed with the given secret
    Token {
        #[arg(long)]
        sub: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        wallet: Option<String>,
        #[arg(long)]
        secret: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

fn bearer(value: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    if !value.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", value))?,
        );
    }
    Ok(headers)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let admin = bearer(&cli.key)?;
    let user = bearer(&cli.token)?;

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(admin)
                .send()
                .await?
        }
        Commands::Prayer => {
            client
                .get(format!("{}/admin/prayer", cli.url))
                .headers(admin)
                .send()
                .await?
        }
        Commands::Pray => {
            client
                .post(format!("{}/admin/prayer/run", cli.url))
                .headers(admin)
                .send()
                .await?
        }
        Commands::Guilds => client.get(format!("{}/guilds", cli.url)).send().await?,
        Commands::Guild { id } => {
            client
                .get(format!("{}/guilds/{}", cli.url, id))
                .send()
                .await?
        }
        Commands::CreateGuild { name, description } => {
            client
                .post(format!("{}/guilds", cli.url))
                .headers(user)
                .json(&json!({ "name": name, "description": description }))
                .send()
                .await?
        }
        Commands::Token {
            sub,
            name,
            wallet,
            secret,
            hours,
        } => {
            let mut claims = Claims::new(sub, Duration::hours(hours));
            if let Some(name) = name {
                claims = claims.with_name(name);
            }
            if let Some(wallet) = wallet {
                claims = claims.with_wallet(wallet);
            }
            println!("{}", issue_token(&secret, &claims)?);
            return Ok(());
        }
    };

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
