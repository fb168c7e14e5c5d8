use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings_from, load_settings, mount_personal_info, ActionOutcome, AvatarFile,
    BroadcastSink, FileInput, NotificationKind, PanelView,
};
use shared::protocol::ProfileField;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "View and edit the personal info of the signed-in account")]
struct Args {
    /// Overrides `api_base_url` from the settings file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file to read instead of ./client.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Show,
    Save {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    AvatarSet {
        path: PathBuf,
    },
    AvatarDelete,
}

async fn read_avatar(path: &Path) -> Result<AvatarFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read avatar file '{}'", path.display()))?;
    let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
    if !mime_type.as_deref().is_some_and(FileInput::accepts) {
        warn!(
            path = %path.display(),
            mime_type = mime_type.as_deref().unwrap_or("unknown"),
            "avatar is not a png/jpeg image; the server may reject it"
        );
    }
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(AvatarFile::new(filename, mime_type, bytes))
}

fn print_view(view: &PanelView) {
    let Some(user) = &view.user else {
        println!("Not signed in.");
        return;
    };
    println!("{} ({})", view.display_name, view.initials);
    for field in ProfileField::ALL {
        println!("  {:<11} {}", field.label(), field.value_of(user));
    }
    println!("  {:<11} {}", "E-mail", view.email);
    println!(
        "  {:<11} {}",
        "Avatar",
        user.avatar.as_deref().unwrap_or("(none)")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(server_url) = args.server_url {
        settings.api_base_url = server_url;
    }

    let sink = Arc::new(BroadcastSink::new(16));
    let mut notifications = sink.subscribe();
    let panel = mount_personal_info(&settings, sink)
        .await
        .context("failed to set up account client")?;
    if panel.store().user().is_none() {
        bail!("not signed in at {}", settings.api_base_url);
    }

    let (action, outcome) = match args.command {
        Command::Show => {
            print_view(&panel.view());
            return Ok(());
        }
        Command::Save {
            first_name,
            last_name,
            phone,
        } => {
            let mut form = panel.form();
            for (field, value) in [
                (ProfileField::FirstName, first_name),
                (ProfileField::LastName, last_name),
                (ProfileField::Phone, phone),
            ] {
                if let Some(value) = value {
                    form.set(field, value);
                }
            }
            ("save profile", panel.on_profile_submit(&form).await)
        }
        Command::AvatarSet { path } => {
            let mut input = FileInput::new();
            input.select(read_avatar(&path).await?);
            ("update avatar", panel.on_avatar_change(&mut input).await)
        }
        Command::AvatarDelete => ("delete avatar", panel.on_avatar_delete().await),
    };

    while let Ok(notification) = notifications.try_recv() {
        let level = match notification.kind {
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info | NotificationKind::Success => "info",
        };
        println!("[{level}] {}", notification.message);
    }

    match outcome {
        ActionOutcome::Succeeded => {
            print_view(&panel.view());
            Ok(())
        }
        ActionOutcome::Skipped => {
            println!("Nothing to {action}.");
            Ok(())
        }
        ActionOutcome::Failed { message } => bail!("{action} failed: {message}"),
    }
}
