use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use jarvisx::engine::Assistant;
use jarvisx::types::ChatEvent;
use jarvisx::{config, repl, secrets};

#[derive(Parser)]
#[command(name = "jarvisx")]
#[command(about = "A personal AI assistant for the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session (the default)
    Chat,

    /// Ask a single question and exit
    Ask {
        /// The prompt to send
        prompt: String,
    },

    /// List available models
    Models,

    /// Show configuration and key status
    Status,

    /// Manage provider API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key (prompted, never echoed)
    Set {
        /// Provider: openrouter, openai, google, or deepseek
        provider: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = config::load()?;
            repl::run(Assistant::new(config)).await
        }
        Commands::Ask { prompt } => {
            let config = config::load()?;
            let mut assistant = Assistant::new(config);

            let (tx, mut rx) = mpsc::channel::<ChatEvent>(32);
            let printer = tokio::spawn(async move {
                use std::io::Write as _;
                while let Some(event) = rx.recv().await {
                    match event {
                        ChatEvent::Text(chunk) => {
                            print!("{chunk}");
                            let _ = std::io::stdout().flush();
                        }
                        ChatEvent::Done => break,
                        _ => {}
                    }
                }
            });
            let result = assistant.chat(&prompt, tx).await;
            let _ = printer.await;
            println!();
            result.map(|_| ()).map_err(Into::into)
        }
        Commands::Models => {
            let config = config::load()?;
            let assistant = Assistant::new(config);
            for (provider, names) in assistant.catalog().by_provider() {
                println!("{provider}:");
                for name in names {
                    let marker = if name == assistant.current_model() {
                        "*"
                    } else {
                        " "
                    };
                    println!("  {marker} {name}");
                }
            }
            Ok(())
        }
        Commands::Status => {
            let config = config::load()?;
            println!("jarvisx v{}", env!("CARGO_PKG_VERSION"));
            println!("config: {}", config::config_path().display());
            println!("model: {}", config.assistant.default_model);
            println!("personality: {}", config.assistant.default_personality);
            for provider in [
                jarvisx::catalog::Provider::OpenRouter,
                jarvisx::catalog::Provider::OpenAi,
                jarvisx::catalog::Provider::Google,
                jarvisx::catalog::Provider::DeepSeek,
            ] {
                let status = if config.providers.get(provider).is_some() {
                    "key configured"
                } else {
                    "no key"
                };
                println!("  {provider:<10} {status}");
            }
            Ok(())
        }
        Commands::Key { action } => match action {
            KeyAction::Set { provider } => {
                let key = rpassword::prompt_password(format!("API key for {provider}: "))?;
                secrets::store_api_key(&provider, &key)?;
                println!("Stored key for {provider}.");
                Ok(())
            }
        },
    }
}
