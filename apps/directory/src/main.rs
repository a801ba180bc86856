use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::normalize_api_url, load_settings, DirectoryController, DirectorySink, EmployeeField,
    FileUpload, HttpEmployeeApi,
};
use shared::domain::EmployeeId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod prompt;
mod render;
mod report;

use report::Reporter;

#[derive(Parser, Debug)]
#[command(name = "directory", about = "Employee directory client")]
struct Args {
    /// Backend base URL, e.g. http://localhost:5182
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file (defaults to ./directory.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every employee
    List,
    /// Filter employees server-side; an empty keyword is passed through
    Search {
        #[arg(default_value = "")]
        keyword: String,
    },
    /// Show one employee's detail record
    Show { id: i64 },
    /// Register a new employee
    Add {
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        fields: Vec<(EmployeeField, String)>,
    },
    /// Change fields of an existing employee
    Edit {
        id: i64,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        fields: Vec<(EmployeeField, String)>,
    },
    /// Delete an employee after confirmation
    Delete {
        id: i64,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Replace an employee's photo
    Photo { id: i64, path: PathBuf },
    /// Bulk-import employees from a CSV file
    Import { path: PathBuf },
    /// Download all employees as CSV
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn parse_assignment(raw: &str) -> Result<(EmployeeField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.parse::<EmployeeField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let failed = run(args).await?;
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Returns whether any action reported an error.
async fn run(args: Args) -> Result<bool> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url.as_deref() {
        settings.api_url = normalize_api_url(api_url)?;
    }
    info!(api_url = %settings.api_url, "using employee api");

    let api = HttpEmployeeApi::with_timeout(
        settings.api_url.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("failed to build http client")?;
    let mut controller = DirectoryController::new(Arc::new(api));
    let mut reporter = Reporter::new(controller.subscribe_events());

    match args.command {
        Command::List => {
            controller.load_all().await;
            reporter.flush();
            print_collection(&controller);
        }
        Command::Search { keyword } => {
            controller.search(&keyword).await;
            reporter.flush();
            print_collection(&controller);
        }
        Command::Show { id } => {
            controller.open_detail(EmployeeId(id)).await;
            reporter.flush();
            print_modal(&controller);
        }
        Command::Add { fields } => {
            controller.open_add();
            for (field, value) in fields {
                controller.set_field(field, value);
            }
            controller.save().await;
            reporter.flush();
            print_collection_after_write(&controller);
        }
        Command::Edit { id, fields } => {
            controller.open_detail(EmployeeId(id)).await;
            if controller.modal().is_some() {
                controller.begin_edit();
                for (field, value) in fields {
                    controller.set_field(field, value);
                }
                controller.save().await;
            }
            reporter.flush();
            print_collection_after_write(&controller);
        }
        Command::Delete { id, yes } => {
            controller.open_detail(EmployeeId(id)).await;
            reporter.flush();
            if controller.modal().is_some() {
                print_modal(&controller);
                controller
                    .delete(|question| yes || prompt::confirm(question))
                    .await;
                reporter.flush();
                print_collection_after_write(&controller);
            }
        }
        Command::Photo { id, path } => {
            let photo = FileUpload::from_path(&path)
                .await
                .with_context(|| format!("cannot use {} as photo", path.display()))?;
            controller.open_detail(EmployeeId(id)).await;
            if controller.modal().is_some() {
                controller.replace_photo(photo).await;
            }
            reporter.flush();
        }
        Command::Import { path } => {
            let file = FileUpload::from_path(&path)
                .await
                .with_context(|| format!("cannot import {}", path.display()))?
                .with_default_mime("text/csv");
            controller.import_csv(file).await;
            reporter.flush();
            print_collection_after_write(&controller);
        }
        Command::Export { out_dir } => {
            let sink = DirectorySink::new(out_dir.unwrap_or(settings.export_dir));
            controller.export_csv(&sink).await;
            reporter.flush();
        }
    }

    Ok(reporter.failed())
}

fn print_collection(controller: &DirectoryController) {
    if controller.error().is_none() {
        print!("{}", render::table(controller.employees()));
    }
}

/// The collection is only reloaded after a write went through; nothing is
/// printed when the modal is still open or the reload failed.
fn print_collection_after_write(controller: &DirectoryController) {
    if controller.modal().is_none() && !controller.employees().is_empty() {
        print_collection(controller);
    }
}

fn print_modal(controller: &DirectoryController) {
    if let Some(modal) = controller.modal() {
        print!(
            "{}",
            render::detail(modal.displayed(), controller.api_url())
        );
    }
}
