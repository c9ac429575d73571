use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, AssumeYes, ConfirmPrompt, HttpDocumentGateway, LandingPage, UpdateNotifier,
};
use shared::domain::DocumentId;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod render;
mod terminal;

use render::render_documents;
use terminal::{StdinConfirm, TerminalNotices};

#[derive(Parser, Debug)]
#[command(name = "doc_client", about = "Upload, list and delete stored documents")]
struct Args {
    /// Base address of the document API; overrides client.toml and API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored documents.
    List,
    /// Upload a file with its metadata, then show the refreshed list.
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        birthday: String,
    },
    /// Delete a document by id after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    info!(api_url = %settings.api_url, "using document api");

    let gateway = Arc::new(HttpDocumentGateway::from_settings(&settings)?);
    let confirm: Arc<dyn ConfirmPrompt> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(AssumeYes),
        _ => Arc::new(StdinConfirm),
    };
    let mut page = LandingPage::mount(
        gateway,
        UpdateNotifier::new(),
        Arc::new(TerminalNotices),
        confirm,
    )?;
    page.list.settle().await;

    match args.command {
        Command::List => {}
        Command::Upload {
            file,
            company,
            contact,
            birthday,
        } => {
            page.upload.company_name = company;
            page.upload.contact_name = contact;
            page.upload.birthday = birthday;
            if let Err(error) = page.upload.select_file_from_path(&file).await {
                error!("could not select file: {error:#}");
            }
            page.upload.upload_file().await;
            page.list.settle().await;
        }
        Command::Delete { id, .. } => {
            let document_id = DocumentId::from(id);
            match page.list.find(&document_id) {
                Some(document) => {
                    page.list.delete_document(&document).await;
                }
                None => println!("No document with id {document_id}."),
            }
        }
    }

    print!("{}", render_documents(&page.list.documents()));
    page.unmount();
    Ok(())
}
