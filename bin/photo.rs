//! `folio-photo`: manage the locally stored profile photo.

use clap::{Parser, Subcommand};
use folio::config;
use folio::constants::{PHOTO_DB_NAME, PROFILE_PHOTO_KEY};
use folio::photo::{Display, DisplayRegistry, PhotoController, PhotoState, SqliteBlobStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio-photo", about = "Manage the portfolio profile photo")]
struct Cli {
    /// Local photo database
    #[arg(long, default_value = PHOTO_DB_NAME)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show what the page would display
    Show,
    /// Normalize an image and store it as the profile photo
    Set { file: PathBuf },
    /// Write the stored photo to a file
    Export { out: PathBuf },
    /// Remove the stored photo
    Remove,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter("folio=info"))
        .init();

    let cli = Cli::parse();
    let store = SqliteBlobStore::open(&cli.db).await?;
    let mut controller = PhotoController::new(store.clone(), DisplayRegistry::new());

    controller.mount().await;

    let state = match cli.command {
        Command::Show => {
            match controller.display() {
                Display::Photo(url) => {
                    let size = controller.current_blob().map(|b| b.bytes.len()).unwrap_or(0);
                    let stored = store.stored_at(PROFILE_PHOTO_KEY).await?;
                    println!("🖼️  {} ({} bytes)", url, size);
                    if let Some(at) = stored {
                        println!("   stored at {}", at.to_rfc3339());
                    }
                }
                Display::Default(path) => println!("🖼️  default image {}", path),
            }
            controller.state().clone()
        }
        Command::Set { file } => {
            let bytes = tokio::fs::read(&file).await?;
            println!("📂 Loaded {} ({} bytes)", file.display(), bytes.len());
            controller.upload(bytes).await.clone()
        }
        Command::Export { out } => {
            let blob = controller
                .current_blob()
                .ok_or_else(|| anyhow::anyhow!("no photo stored"))?;
            tokio::fs::write(&out, &blob.bytes).await?;
            println!("💾 Wrote {} ({})", out.display(), blob.media_type);
            controller.state().clone()
        }
        Command::Remove => controller.remove().await.clone(),
    };

    drop(controller);
    store.close().await;

    match state {
        PhotoState::Error(message) => Err(anyhow::anyhow!(message)),
        PhotoState::Loaded(_) => {
            println!("✅ Photo ready");
            Ok(())
        }
        PhotoState::Default | PhotoState::Loading => {
            println!("✅ Using default image");
            Ok(())
        }
    }
}
