use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use curation_lib::forms::FeatureDraft;
use curation_lib::taxonomy::{build_tree, render};
use curation_lib::types::Feature;
use curation_lib::validation::MAX_PAGE_SIZE;
use curation_lib::{Filters, ResourceController};

use super::resource::{self, ResourceCommand};
use super::Context;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct FeaturesArgs {
    #[command(subcommand)]
    pub command: FeaturesCommand,
}

#[derive(Subcommand)]
pub enum FeaturesCommand {
    #[command(flatten)]
    Resource(ResourceCommand),
    /// Print the feature taxonomy as an indented tree
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// Only include one category (style, scene, subject, color, composition)
    #[arg(long)]
    pub category: Option<String>,
}

pub async fn run(args: &FeaturesArgs, ctx: &Context, format: &OutputFormat) -> Result<()> {
    match &args.command {
        FeaturesCommand::Resource(command) => resource::run::<FeatureDraft>(command, ctx, format).await,
        FeaturesCommand::Tree(tree_args) => tree(tree_args, ctx, format).await,
    }
}

async fn tree(args: &TreeArgs, ctx: &Context, format: &OutputFormat) -> Result<()> {
    let mut filters = Filters::new();
    if let Some(category) = &args.category {
        filters.set("category", category.trim().to_lowercase());
    }
    let controller = ResourceController::<Feature>::with_page_size(
        Arc::clone(&ctx.client),
        Arc::clone(&ctx.notifier),
        MAX_PAGE_SIZE,
    )
    .with_filters(&filters);

    // The tree needs every parent, so walk all pages.
    let mut features = Vec::new();
    let mut page = 1;
    loop {
        controller.load(page, MAX_PAGE_SIZE).await?;
        let state = controller.snapshot();
        let done = state.items.is_empty() || page >= state.pagination.total_pages();
        features.extend(state.items);
        if done {
            break;
        }
        page += 1;
    }

    let trees = build_tree(&features);
    eprintln!("{} features in {} trees", features.len(), trees.len());
    match format {
        OutputFormat::Json => print_json(&trees),
        _ => {
            for line in render(&trees) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
