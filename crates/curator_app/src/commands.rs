use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use curator_core::{CollectionId, JobId, JobStatus, TransferSelection};
use curator_engine::Session;
use curator_logging::{curator_debug, curator_info};

use crate::cli::{Command, ConfigCommand, PageArgs};
use crate::config::AppConfig;
use crate::render;

pub async fn run(command: Command, config: &AppConfig, config_path: &Path) -> Result<()> {
    if let Command::Config(command) = command {
        return run_config(command, config, config_path);
    }

    let session = Session::connect(config.gateway_settings(), config.session_settings())
        .context("failed to set up the API client")?;
    curator_debug!("Using API at {}", config.base_url);
    session
        .load_collections()
        .await
        .context("failed to load collections")?;

    let result = match command {
        Command::Collections => {
            println!("{}", render::render_collections(&session.view()));
            Ok(())
        }
        Command::Show(args) => show(&session, &args).await,
        Command::Like {
            page,
            company_id,
            unlike,
        } => like(&session, &page, company_id, !unlike).await,
        Command::Transfer {
            source,
            target,
            ids,
            no_wait,
        } => transfer(&session, &source, &target, ids, no_wait).await,
        Command::Create { name } => {
            let id = session.create_collection(name).await?;
            print_latest_notification(&session);
            curator_info!("Created collection {}", id);
            Ok(())
        }
        Command::Delete { collection } => {
            let id = resolve(&session, &collection)?;
            session.delete_collection(id).await?;
            print_latest_notification(&session);
            Ok(())
        }
        Command::Remove { collection, ids } => {
            let id = resolve(&session, &collection)?;
            session.select_collection(id).await?;
            let removed = session.remove_companies(ids).await?;
            print_latest_notification(&session);
            curator_info!("Removed {} companies", removed);
            Ok(())
        }
        Command::Config(_) => Ok(()),
    };

    session.shutdown().await;
    result
}

fn run_config(command: ConfigCommand, config: &AppConfig, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{}", config.to_ron()?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to replace it)", path.display());
            }
            let written = config.save(path)?;
            println!("Wrote {}", written.display());
        }
    }
    Ok(())
}

fn resolve(session: &Session, key: &str) -> Result<CollectionId> {
    session
        .with_state(|state| state.catalog().resolve(key).map(|c| c.id.clone()))
        .ok_or_else(|| anyhow!("no collection with id or name '{key}'"))
}

/// Opens the requested page of a collection and applies the filter.
async fn open_page(session: &Session, args: &PageArgs) -> Result<()> {
    let id = resolve(session, &args.collection)?;
    session.select_collection(id).await?;
    if args.page != 1 {
        session.set_page(args.page).await?;
    }
    if let Some(term) = &args.search {
        session.set_search_term(term.as_str()).await?;
    }
    Ok(())
}

async fn show(session: &Session, args: &PageArgs) -> Result<()> {
    open_page(session, args).await?;
    println!("{}", render::render_page(&session.view()));
    Ok(())
}

async fn like(session: &Session, args: &PageArgs, company_id: i64, liked: bool) -> Result<()> {
    open_page(session, args).await?;
    session.toggle_favorite(company_id, liked).await?;
    let view = session.view();
    if let Some(row) = view.rows.iter().find(|row| row.id == company_id) {
        let state = if row.liked { "liked" } else { "not liked" };
        println!("{} is now {state}", row.name);
    }
    Ok(())
}

async fn transfer(
    session: &Session,
    source: &str,
    target: &str,
    ids: Vec<i64>,
    no_wait: bool,
) -> Result<()> {
    let source = resolve(session, source)?;
    let target = resolve(session, target)?;
    session.select_collection(source).await?;

    let selection = if ids.is_empty() {
        TransferSelection::All
    } else {
        TransferSelection::Ids(ids)
    };
    let job_id = session.transfer(target, selection).await?;
    println!("Started transfer job {job_id}");
    if no_wait {
        return Ok(());
    }

    follow_job(session, &job_id).await;

    let view = session.view();
    let job = view
        .jobs
        .iter()
        .find(|job| job.job_id == job_id)
        .ok_or_else(|| anyhow!("transfer job {job_id} disappeared"))?;
    println!("{}", render::format_job_row(job));
    match job.status {
        JobStatus::Completed => {
            if !view.history.is_empty() {
                println!("{}", render::render_history(&view.history[..1]));
            }
            Ok(())
        }
        JobStatus::Failed => Err(anyhow!(
            "transfer job {job_id} failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        )),
        JobStatus::Queued | JobStatus::Running => {
            Err(anyhow!("transfer job {job_id} was still running"))
        }
    }
}

/// Prints a progress line whenever the job's row changes, until polling stops.
async fn follow_job(session: &Session, job_id: &JobId) {
    let mut changes = session.changes();
    let mut finished = std::pin::pin!(session.wait_for_jobs());
    let mut last = String::new();
    loop {
        tokio::select! {
            _ = &mut finished => return,
            changed = changes.changed() => {
                if changed.is_err() {
                    return;
                }
                let view = session.view();
                let Some(job) = view.jobs.iter().find(|job| &job.job_id == job_id) else {
                    continue;
                };
                if job.status.is_terminal() {
                    continue;
                }
                let line = render::format_job_row(job);
                if line != last {
                    println!("{line}");
                    last = line;
                }
            }
        }
    }
}

fn print_latest_notification(session: &Session) {
    if let Some(notification) = session.view().notifications.first() {
        println!("{}", render::format_notification(notification));
    }
}
