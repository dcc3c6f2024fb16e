//! The subcommands every resource shares: list, show, create, update,
//! delete, bulk-delete, restore and run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use curation_lib::types::{Resource, Trackable};
use curation_lib::{
    validation, ActionOutcome, ConsoleError, Draft, FormSession, LongRunningActionTracker, Notice,
    ResourceController, SaveKind,
};
use indicatif::{ProgressBar, ProgressStyle};

use super::{parse_filters, parse_pair, Context, Reported};
use crate::output::{print_items, print_json, Listing, OutputFormat};

#[derive(Subcommand)]
pub enum ResourceCommand {
    /// List one page
    List(ListArgs),
    /// Show one record with every field the detail endpoint returns
    Show {
        id: i64,
    },
    /// Create a record from field=value pairs
    Create(SetArgs),
    /// Update fields on an existing record
    Update {
        id: i64,
        #[command(flatten)]
        fields: SetArgs,
    },
    /// Delete one record
    Delete {
        id: i64,
    },
    /// Delete several records in one request
    BulkDelete {
        ids: Vec<i64>,
    },
    /// Restore soft-deleted records
    Restore {
        ids: Vec<i64>,
    },
    /// Trigger a long-running action (execute, crawl, package, calculate, refresh)
    Run(RunArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Page number
    #[arg(long, default_value = "1")]
    pub page: i64,

    /// Results per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<i64>,

    /// Filter as key=value, repeatable (e.g. --filter status=active)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Field as name=value, repeatable (e.g. --set name=portraits)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct RunArgs {
    pub id: i64,

    /// Action name
    pub action: String,

    /// Poll until the action finishes or the configured timeout elapses
    #[arg(long)]
    pub wait: bool,
}

/// Runs any subcommand except `run`.
pub async fn run<D>(command: &ResourceCommand, ctx: &Context, format: &OutputFormat) -> Result<()>
where
    D: Draft,
    D::Record: Listing + Resource<Id = i64>,
{
    match command {
        ResourceCommand::List(args) => list::<D::Record>(args, ctx, format).await,
        ResourceCommand::Show { id } => {
            let record = ctx.fetch::<D::Record>(id).await?;
            show(&record, format)
        }
        ResourceCommand::Create(args) => {
            let mut session = FormSession::<D>::new(Arc::clone(&ctx.client), Arc::clone(&ctx.notifier));
            session.open_create(D::default());
            submit(session, args, format).await
        }
        ResourceCommand::Update { id, fields } => {
            let record = ctx.fetch::<D::Record>(id).await?;
            let mut session = FormSession::<D>::new(Arc::clone(&ctx.client), Arc::clone(&ctx.notifier));
            session.open_edit(&record).await;
            submit(session, fields, format).await
        }
        ResourceCommand::Delete { id } => {
            controller::<D::Record>(ctx).remove(id).await?;
            Ok(())
        }
        ResourceCommand::BulkDelete { ids } => {
            controller::<D::Record>(ctx).bulk_remove(ids).await?;
            Ok(())
        }
        ResourceCommand::Restore { ids } => {
            controller::<D::Record>(ctx).bulk_restore(ids).await?;
            Ok(())
        }
        ResourceCommand::Run(_) => bail!(
            "{} has no long-running actions",
            <D::Record as Resource>::LABEL
        ),
    }
}

/// Like [`run`], for resources that also carry long-running actions.
pub async fn run_trackable<D>(
    command: &ResourceCommand,
    ctx: &Context,
    format: &OutputFormat,
) -> Result<()>
where
    D: Draft,
    D::Record: Listing + Trackable + Resource<Id = i64>,
{
    match command {
        ResourceCommand::Run(args) => run_action::<D::Record>(args, ctx).await,
        other => run::<D>(other, ctx, format).await,
    }
}

fn controller<R: Resource>(ctx: &Context) -> ResourceController<R> {
    ResourceController::with_page_size(
        Arc::clone(&ctx.client),
        Arc::clone(&ctx.notifier),
        ctx.config.page_size,
    )
}

async fn list<R>(args: &ListArgs, ctx: &Context, format: &OutputFormat) -> Result<()>
where
    R: Listing + Resource<Id = i64>,
{
    let page = validation::validate_page(args.page)?;
    let page_size = validation::validate_page_size(args.page_size.unwrap_or(ctx.config.page_size))?;
    let filters = parse_filters(&args.filters)?;

    let controller = controller::<R>(ctx).with_filters(&filters);
    controller.load(page, page_size).await?;
    let state = controller.snapshot();

    eprintln!(
        "Page {}/{} ({} total {} records)",
        state.pagination.current,
        state.pagination.total_pages(),
        state.pagination.total,
        R::LABEL
    );
    print_items(&state.items, format)
}

fn show<R: Listing>(record: &R, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(record);
            Ok(())
        }
        _ => print_items(std::slice::from_ref(record), format),
    }
}

async fn submit<D>(mut session: FormSession<D>, args: &SetArgs, format: &OutputFormat) -> Result<()>
where
    D: Draft,
    D::Record: Listing,
{
    for raw in &args.fields {
        let (name, value) = parse_pair(raw)?;
        session.set_named(name, value)?;
    }
    if !session.is_dirty() {
        eprintln!("Nothing to save; pass fields with --set name=value");
        return Ok(());
    }

    let saved = session.submit().await?;
    match saved.record {
        Some(record) => show(&record, format),
        None => {
            let verb = match saved.kind {
                SaveKind::Created => "created",
                SaveKind::Updated => "updated",
            };
            eprintln!("{} {}; the server sent no record back", <D::Record as Resource>::LABEL, verb);
            Ok(())
        }
    }
}

async fn run_action<R>(args: &RunArgs, ctx: &Context) -> Result<()>
where
    R: Listing + Trackable + Resource<Id = i64>,
{
    if !args.wait {
        return fire::<R>(args, ctx).await;
    }

    let controller = Arc::new(controller::<R>(ctx));
    let tracker = LongRunningActionTracker::new(
        controller,
        Arc::clone(&ctx.client),
        Arc::clone(&ctx.notifier),
        ctx.config.tracker(),
    );
    let handle = tracker.start(args.id, &args.action)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("[{elapsed_precise}] {spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    let outcome = loop {
        pb.set_message(format!(
            "{} {} {}: {}",
            args.action,
            R::LABEL,
            args.id,
            handle.current().status
        ));
        tokio::select! {
            outcome = handle.wait() => break outcome,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {}
        }
    };
    pb.finish_and_clear();

    match outcome {
        ActionOutcome::Succeeded | ActionOutcome::StillRunning => Ok(()),
        ActionOutcome::Failed(_) | ActionOutcome::Rejected(_) => Err(Reported.into()),
        ActionOutcome::Cancelled => bail!("Stopped tracking {} {} {}", args.action, R::LABEL, args.id),
    }
}

/// Sends the action request without waiting for the outcome.
async fn fire<R: Trackable + Resource<Id = i64>>(args: &RunArgs, ctx: &Context) -> Result<()> {
    if !R::ACTIONS.contains(&args.action.as_str()) {
        bail!(ConsoleError::InvalidInput(format!(
            "'{}' is not an action on {} (expected one of: {})",
            args.action,
            R::LABEL,
            R::ACTIONS.join(", ")
        )));
    }
    let error = match ctx.client.action::<R>(&args.id, &args.action).await {
        Ok(env) if env.is_success() => {
            ctx.notifier.notify(Notice::info(format!(
                "Started: {} {} {}",
                args.action,
                R::LABEL,
                args.id
            )));
            return Ok(());
        }
        Ok(env) => ConsoleError::Application {
            code: env.code,
            message: env.message,
        },
        Err(e) => ConsoleError::Api(e),
    };
    Err(ctx.report(error))
}
