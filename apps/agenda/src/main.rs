use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    form::{CreationForm, FormField},
    view::{DetailView, ListView},
    DirectoryController, HttpContactBackend, LoadOutcome, SubmitOutcome,
};
use shared::domain::ContactId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod browse;
mod prompt;
mod render;
mod settings;

use prompt::Prompt;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "agenda", about = "Browse and manage a contact directory")]
struct Args {
    /// Settings file; defaults to ./agenda.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of contacts.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Show a single contact.
    Show { id: i64 },
    /// Create a contact.
    Add {
        #[arg(long)]
        photo: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// Delete a contact.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Interactive mode (default).
    Browse,
}

async fn print_notifications(controller: &DirectoryController) {
    for note in controller.drain_notifications().await {
        println!("{}", render::notification(&note));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings =
        Settings::load(args.config.as_deref()).context("failed to load settings")?;
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size.max(1);
    }
    info!(
        api_base_url = %settings.api_base_url,
        page_size = settings.page_size,
        "starting agenda"
    );

    let backend = HttpContactBackend::with_timeout(
        &settings.api_base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("failed to configure backend client")?;
    let controller = DirectoryController::new(Arc::new(backend), settings.page_size);
    let mut prompt = Prompt::new();

    match args.command.unwrap_or(Command::Browse) {
        Command::Browse => browse::run(&controller, &mut prompt).await?,
        Command::List { page, query } => {
            let outcome = controller
                .load(page, settings.page_size, query.as_deref())
                .await;
            print_notifications(&controller).await;
            if let LoadOutcome::Failed(err) = outcome {
                return Err(err).context("failed to list contacts");
            }
            print!("{}", render::list(&ListView::from_state(&controller.snapshot().await)));
        }
        Command::Show { id } => {
            let contact = controller
                .fetch_contact(ContactId(id))
                .await
                .with_context(|| format!("failed to fetch contact {id}"))?;
            print!("{}", render::detail(&DetailView::from(&contact)));
        }
        Command::Add {
            photo,
            name,
            description,
        } => {
            let mut form = CreationForm::new();
            form.open();
            form.set(FormField::PhotoUrl, photo);
            form.set(FormField::Name, name);
            form.set(FormField::Description, description);
            match form.submit(&controller).await {
                SubmitOutcome::Created(contact) => {
                    print_notifications(&controller).await;
                    println!("id: {}", contact.id);
                }
                SubmitOutcome::Invalid | SubmitOutcome::Failed(_) => {
                    eprint!("{}", render::form_errors(&form));
                    bail!("contact was not created");
                }
            }
        }
        Command::Delete { id, yes } => {
            if !yes && !prompt.confirm(&format!("Delete contact {id}?")).await? {
                println!("Cancelled.");
                return Ok(());
            }
            let result = controller.remove(ContactId(id)).await;
            print_notifications(&controller).await;
            result.with_context(|| format!("failed to delete contact {id}"))?;
        }
    }

    Ok(())
}
