use std::io;

use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use yansi::Paint;

use crate::application::chat::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// What the binary should do after configuration is loaded.
pub enum Mode {
    Serve,
    Chat,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn arg_host() -> Arg {
    return Arg::new(ConfigKey::Host.to_string())
        .long(ConfigKey::Host.to_string())
        .env("SAMOVAR_HOST")
        .num_args(1)
        .help(format!(
            "The address the relay binds to. [default: {}]",
            Config::default(ConfigKey::Host)
        ));
}

fn arg_port() -> Arg {
    return Arg::new(ConfigKey::Port.to_string())
        .short('p')
        .long(ConfigKey::Port.to_string())
        .env("SAMOVAR_PORT")
        .num_args(1)
        .help(format!(
            "The port the relay binds to. [default: {}]",
            Config::default(ConfigKey::Port)
        ));
}

fn arg_upstream_url() -> Arg {
    return Arg::new(ConfigKey::UpstreamUrl.to_string())
        .long(ConfigKey::UpstreamUrl.to_string())
        .env("SAMOVAR_UPSTREAM_URL")
        .num_args(1)
        .help(format!(
            "The upstream gateway API URL. [default: {}]",
            Config::default(ConfigKey::UpstreamUrl)
        ));
}

fn arg_upstream_key() -> Arg {
    return Arg::new(ConfigKey::UpstreamKey.to_string())
        .long(ConfigKey::UpstreamKey.to_string())
        .env("SAMOVAR_UPSTREAM_KEY")
        .num_args(1)
        .help("The upstream gateway API key. Without it the relay answers chat requests with a placeholder.");
}

fn arg_relay_url() -> Arg {
    return Arg::new(ConfigKey::RelayUrl.to_string())
        .short('u')
        .long(ConfigKey::RelayUrl.to_string())
        .env("SAMOVAR_RELAY_URL")
        .num_args(1)
        .help(format!(
            "The relay to chat through. [default: {}]",
            Config::default(ConfigKey::RelayUrl)
        ));
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("SAMOVAR_MODEL")
        .num_args(1)
        .help("The model to chat with, as provider:model. Defaults to the relay's default model.");
}

fn arg_username() -> Arg {
    return Arg::new(ConfigKey::Username.to_string())
        .long(ConfigKey::Username.to_string())
        .env("SAMOVAR_USERNAME")
        .num_args(1)
        .help(format!(
            "The name shown at the prompt. [default: {}]",
            Config::default(ConfigKey::Username)
        ));
}

fn subcommand_serve() -> Command {
    return Command::new("serve")
        .about("Run the chat relay server.")
        .arg(arg_host())
        .arg(arg_port())
        .arg(arg_upstream_url())
        .arg(arg_upstream_key());
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a chat session against a running relay.")
        .arg(arg_relay_url())
        .arg(arg_model())
        .arg(arg_username());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}")).underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    return Command::new("samovar")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(true)
        .subcommand(subcommand_serve())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions());
}

/// Parses the command line and loads configuration. Returns `None` when the
/// invocation was fully handled here (completions, no subcommand).
pub async fn parse() -> Result<Option<Mode>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            Config::load(vec![&matches, serve_matches]);
            return Ok(Some(Mode::Serve));
        }
        Some(("chat", chat_matches)) => {
            Config::load(vec![&matches, chat_matches]);
            return Ok(Some(Mode::Chat));
        }
        Some(("completions", completions_matches)) => {
            if let Some(shell) = completions_matches.get_one::<Shell>("shell").copied() {
                let mut cmd = build();
                print_completions(shell, &mut cmd);
            }
            return Ok(None);
        }
        _ => {
            return Ok(None);
        }
    }
}
