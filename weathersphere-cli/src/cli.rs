use std::sync::Arc;

use clap::{Parser, Subcommand};
use inquire::InquireError;
use tracing::debug;
use weathersphere_core::{Config, HttpBackend, WeatherQueryController};

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathersphere", version, about = "WeatherSphere client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions and the 5-day forecast for a city.
    Show {
        /// City name.
        city: String,
    },

    /// Query cities repeatedly in a prompt loop. Esc or Ctrl-C exits.
    Interactive,

    /// Configure the backend endpoint.
    Configure {
        /// Backend base URL; prompted for interactively when omitted.
        #[arg(long)]
        url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { city } => {
                let controller = controller_from_config()?;
                run_query(&controller, &city).await;
                Ok(())
            }
            Command::Interactive => interactive().await,
            Command::Configure { url } => configure(url),
        }
    }
}

fn controller_from_config() -> anyhow::Result<Arc<WeatherQueryController>> {
    let config = Config::load()?;
    debug!(backend_url = %config.backend_url(), "resolved backend endpoint");
    let backend = HttpBackend::new(config.backend_url());

    Ok(Arc::new(WeatherQueryController::new(Box::new(backend))))
}

/// Submit one query and print every state transition until it settles.
async fn run_query(controller: &Arc<WeatherQueryController>, city: &str) {
    let mut states = controller.subscribe();

    let submission = tokio::spawn({
        let controller = Arc::clone(controller);
        let city = city.to_string();
        async move { controller.submit(&city).await }
    });

    loop {
        if states.changed().await.is_err() {
            break;
        }
        let state = states.borrow_and_update().clone();
        println!("{}", view::render_state(&state));
        if !state.is_loading() {
            break;
        }
    }

    let _ = submission.await;
}

async fn interactive() -> anyhow::Result<()> {
    let controller = controller_from_config()?;

    loop {
        match inquire::Text::new("City:").prompt() {
            Ok(input) => run_query(&controller, &input).await,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn configure(url: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let url = match url {
        Some(url) => url,
        None => inquire::Text::new("Backend base URL:")
            .with_default(config.backend_url())
            .prompt()?,
    };

    config.set_backend_url(url.trim().trim_end_matches('/').to_string());
    config.save()?;

    println!(
        "Saved backend URL to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
