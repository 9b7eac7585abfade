#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::process;

use anyhow::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use yansi::Paint;

use crate::application::chat;
use crate::application::cli;
use crate::application::server;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Samovar has failed with the following version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| return "samovar=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => {
            process::exit(0);
        }
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let res = match mode {
        cli::Mode::Serve => server::start().await,
        cli::Mode::Chat => chat::start().await,
    };

    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
