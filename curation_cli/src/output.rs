use anyhow::Result;
use chrono::{DateTime, Utc};
use curation_lib::types::{
    decode_id_list, Cookie, CrawlTask, Feature, Resource, SampleSet, StyleDefinition,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

/// A resource with a flat row shape for table and CSV output.
pub trait Listing: Resource {
    type Row: Tabled + Serialize;

    fn to_row(&self) -> Self::Row;
}

#[derive(Tabled, Serialize)]
pub struct CookieRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Platform")]
    #[serde(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Account")]
    #[serde(rename = "Account")]
    account: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Checked")]
    #[serde(rename = "Last Checked")]
    last_checked: String,
}

#[derive(Tabled, Serialize)]
pub struct CrawlTaskRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Platform")]
    #[serde(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Mode")]
    #[serde(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Target")]
    #[serde(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Collected")]
    #[serde(rename = "Collected")]
    collected: i64,
    #[tabled(rename = "Last Run")]
    #[serde(rename = "Last Run")]
    last_run: String,
}

#[derive(Tabled, Serialize)]
pub struct FeatureRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Parent")]
    #[serde(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Samples")]
    #[serde(rename = "Samples")]
    samples: i64,
}

#[derive(Tabled, Serialize)]
pub struct SampleSetRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Acquire")]
    #[serde(rename = "Acquire")]
    acquire: String,
    #[tabled(rename = "Images")]
    #[serde(rename = "Images")]
    images: i64,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Package")]
    #[serde(rename = "Package")]
    package: String,
}

#[derive(Tabled, Serialize)]
pub struct StyleRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Features")]
    #[serde(rename = "Features")]
    features: usize,
    #[tabled(rename = "Enabled")]
    #[serde(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Calculation")]
    #[serde(rename = "Calculation")]
    calc_status: String,
    #[tabled(rename = "Matched")]
    #[serde(rename = "Matched")]
    matched: String,
}

// -- Row builders --

impl Listing for Cookie {
    type Row = CookieRow;

    fn to_row(&self) -> CookieRow {
        CookieRow {
            id: self.id,
            platform: self.platform.to_string(),
            name: self.name.clone(),
            account: self.account.clone().unwrap_or_default(),
            status: self.status.to_string(),
            last_checked: format_time(self.last_checked_at),
        }
    }
}

impl Listing for CrawlTask {
    type Row = CrawlTaskRow;

    fn to_row(&self) -> CrawlTaskRow {
        CrawlTaskRow {
            id: self.id,
            name: self.name.clone(),
            platform: self.platform.to_string(),
            mode: self.target.mode().to_string(),
            target: self.target.describe().to_string(),
            status: self.status.to_string(),
            collected: self.collected_count,
            last_run: format_time(self.last_run_at),
        }
    }
}

impl Listing for Feature {
    type Row = FeatureRow;

    fn to_row(&self) -> FeatureRow {
        FeatureRow {
            id: self.id,
            name: self.name.clone(),
            category: self.category.clone(),
            parent: self.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            samples: self.sample_count,
        }
    }
}

impl Listing for SampleSet {
    type Row = SampleSetRow;

    fn to_row(&self) -> SampleSetRow {
        SampleSetRow {
            id: self.id,
            name: self.name.clone(),
            acquire: self.acquire_type.to_string(),
            images: self.image_count,
            status: self.status.to_string(),
            package: self.package_url.clone().unwrap_or_default(),
        }
    }
}

impl Listing for StyleDefinition {
    type Row = StyleRow;

    fn to_row(&self) -> StyleRow {
        StyleRow {
            id: self.id,
            name: self.name.clone(),
            features: decode_id_list(&self.feature_ids).map(|ids| ids.len()).unwrap_or(0),
            enabled: if self.enabled { "yes" } else { "no" }.to_string(),
            calc_status: self.calc_status.to_string(),
            matched: self.matched_count.map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}

fn build_rows<R: Listing>(items: &[R]) -> Vec<R::Row> {
    items.iter().map(Listing::to_row).collect()
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// -- Output --

pub fn print_items<R: Listing>(items: &[R], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(items),
        OutputFormat::Markdown => print_markdown(items),
        OutputFormat::Csv => print_csv(items)?,
        OutputFormat::Json => print_json(&items),
    }
    Ok(())
}

pub fn print_table<R: Listing>(items: &[R]) {
    println!("{}", Table::new(build_rows(items)));
}

pub fn print_markdown<R: Listing>(items: &[R]) {
    let mut table = Table::new(build_rows(items));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<R: Listing>(items: &[R]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_rows(items) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
