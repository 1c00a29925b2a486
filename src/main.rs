use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use milanesa_cart::{
    cli::{self, Command, HELP},
    config::AppConfig,
    dto::seed::StorefrontSeed,
    services::{cart_service::HttpCartGateway, theme_service::FileStore},
    state::AppState,
    storefront::Storefront,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,milanesa_cart=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    let gateway = HttpCartGateway::new(&config)?;
    let store = FileStore::new(config.theme_store.clone());
    let state = AppState::new(&config, Arc::new(gateway), Arc::new(store));

    let seed = match &config.storefront_seed {
        Some(path) => StorefrontSeed::from_file(path).await?,
        None => StorefrontSeed::demo(),
    };
    let mut storefront = Storefront::load(state, seed).await?;
    tracing::info!(gateway = %config.gateway_url, "storefront ready");

    println!("{HELP}");
    println!("{}", cli::render(&storefront));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let keep_going = match cli::parse_command(&line) {
                    Ok(Command::Help) => {
                        println!("{HELP}");
                        true
                    }
                    Ok(command) => match cli::execute(&mut storefront, command).await {
                        Ok(keep_going) => keep_going,
                        Err(err) => {
                            tracing::debug!(error = %err, "command failed");
                            println!("{err}");
                            true
                        }
                    },
                    Err(err) => {
                        println!("{}", err.user_message());
                        true
                    }
                };
                if !keep_going {
                    break;
                }
            }
            Some(event) = storefront.next_event() => {
                storefront.handle_event(event);
            }
        }
        println!("{}", cli::render(&storefront));
    }

    Ok(())
}
