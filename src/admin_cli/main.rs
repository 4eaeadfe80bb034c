use clap::{Parser, Subcommand};
use productly_gateway::api::proxy::Access;
use productly_gateway::api::routes::ROUTES;
use productly_gateway::config::Config;
use productly_gateway::services::upstream::{Forward, UpstreamClient};
use reqwest::Method;

// Определяем структуру команд CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Утилита командной строки для администрирования шлюза Productly.
/// Показывает таблицу маршрутов, итоговую конфигурацию и доступность бэкенда.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Выводит таблицу проксируемых маршрутов.
    Routes {
        /// Показывать только маршруты, требующие сессии.
        #[arg(short, long)]
        protected: bool,
    },
    /// Загружает конфигурацию из окружения, валидирует и печатает её в JSON.
    Config,
    /// Отправляет запрос к бэкенду и печатает статус ответа.
    Ping {
        /// Путь на бэкенде относительно базового URL.
        #[arg(short, long, default_value = "health")]
        path: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Routes { protected } => {
            print_routes(protected);
            Ok(())
        }
        Commands::Config => print_config(),
        Commands::Ping { path } => ping(&path).await,
    };

    if let Err(e) = result {
        eprintln!("Ошибка: {}", e);
        std::process::exit(1);
    }
}

fn print_routes(protected_only: bool) {
    println!("{:<28} {:<20} {:<28} {}", "PATH", "METHODS", "UPSTREAM", "ACCESS");
    for route in ROUTES
        .iter()
        .filter(|r| !protected_only || r.access == Access::Session)
    {
        println!(
            "{:<28} {:<20} {:<28} {:?}",
            format!("/api{}", route.path),
            route.allowed().join(","),
            route.upstream,
            route.access
        );
    }
}

fn print_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn ping(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = UpstreamClient::from_config(&config)?;
    let reply = client.send(Forward::new(Method::GET, path)).await?;
    println!(
        "{} {} -> {}",
        client.base_url(),
        path,
        reply.status
    );
    if !reply.is_success() {
        return Err(format!("backend answered {}", reply.status).into());
    }
    Ok(())
}
