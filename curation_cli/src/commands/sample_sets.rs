use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use curation_lib::forms::SampleSetDraft;
use curation_lib::types::{Resource, SampleSet};
use curation_lib::{ConsoleError, Notice, UploadForm};

use super::resource::{self, ResourceCommand};
use super::{parse_pair, Context};
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct SampleSetsArgs {
    #[command(subcommand)]
    pub command: SampleSetsCommand,
}

#[derive(Subcommand)]
pub enum SampleSetsCommand {
    #[command(flatten)]
    Resource(ResourceCommand),
    /// Upload an image file into a sample set
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct UploadArgs {
    /// Sample set ID
    pub id: i64,

    /// Image file (jpg, png, webp, gif)
    pub file: PathBuf,

    /// Extra form field as name=value, repeatable
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
}

pub async fn run(args: &SampleSetsArgs, ctx: &Context, format: &OutputFormat) -> Result<()> {
    match &args.command {
        SampleSetsCommand::Resource(command) => {
            resource::run_trackable::<SampleSetDraft>(command, ctx, format).await
        }
        SampleSetsCommand::Upload(upload_args) => upload(upload_args, ctx, format).await,
    }
}

/// Collection path images are posted to.
fn upload_path(id: i64) -> String {
    format!("{}/{}/images", SampleSet::PATH, id)
}

async fn upload(args: &UploadArgs, ctx: &Context, format: &OutputFormat) -> Result<()> {
    let Some(file_name) = args.file.file_name().and_then(|n| n.to_str()) else {
        bail!("'{}' is not a file path", args.file.display());
    };
    let Some(mime) = image_mime(&args.file) else {
        bail!(
            "'{}' is not a supported image (expected jpg, png, webp or gif)",
            file_name
        );
    };
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut form = UploadForm::new(file_name, bytes).with_mime(mime);
    for raw in &args.fields {
        let (name, value) = parse_pair(raw)?;
        form = form.with_field(name, value);
    }

    let error = match ctx
        .client
        .upload::<serde_json::Value>(&upload_path(args.id), form)
        .await
    {
        Ok(env) if env.is_success() => {
            ctx.notifier.notify(Notice::success(format!(
                "Uploaded {} to {} {}",
                file_name,
                SampleSet::LABEL,
                args.id
            )));
            if *format == OutputFormat::Json {
                if let Some(data) = env.data {
                    print_json(&data);
                }
            }
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

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
