//! Proposal reports in text, JSON and CSV.

use super::model::{Proposal, Status, TIMESTAMP_FORMAT};
use super::store::{ListFilter, ProposalStore, Statistics};
use crate::metrics::{self, CostSummary};
use crate::storage;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::PrimitiveDateTime;

const WIDE: usize = 70;
const NARROW: usize = 40;
const DESCRIPTION_PREVIEW: usize = 150;
const BENEFIT_PREVIEW: usize = 100;
const CURRENCY: &str = "RUB";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Statistics and the full proposal list
    Full,
    /// Count, share and cost per status
    Status,
    /// Count and cost per category
    Category,
    /// Cost summary and per-proposal costs
    Financial,
}

impl ReportKind {
    fn file_stem(self) -> &'static str {
        match self {
            ReportKind::Full => "full_report",
            ReportKind::Status => "status_report",
            ReportKind::Category => "category_report",
            ReportKind::Financial => "financial_report",
        }
    }

    fn title(self) -> &'static str {
        match self {
            ReportKind::Full => "FULL REPORT ON SYSTEM ENHANCEMENT PROPOSALS",
            ReportKind::Status => "PROPOSAL STATUS REPORT",
            ReportKind::Category => "PROPOSAL CATEGORY REPORT",
            ReportKind::Financial => "FINANCIAL REPORT ON PROPOSALS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Snapshot of the store a report is rendered from.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub generated: PrimitiveDateTime,
    pub proposals: Vec<Proposal>,
    pub stats: Statistics,
}

impl ReportData {
    pub async fn load(store: &ProposalStore) -> Result<Self> {
        let proposals = store
            .list(ListFilter::default())
            .await
            .context("load proposals")?;
        let stats = store.statistics().await.context("load statistics")?;
        Ok(Self {
            generated: super::model::local_now(),
            proposals,
            stats,
        })
    }

    fn costs(&self) -> Vec<f64> {
        self.proposals
            .iter()
            .map(|p| p.fields.estimated_cost)
            .collect()
    }
}

/// `1234567.4` → `1,234,567`.
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, c) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

fn money(value: f64) -> String {
    format!("{} {CURRENCY}", group_thousands(value))
}

/// First `max` characters, with `...` when something was cut.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn or_unspecified(text: &str) -> &str {
    if text.is_empty() {
        "Not specified"
    } else {
        text
    }
}

fn format_date(dt: PrimitiveDateTime) -> String {
    dt.format(format_description!("[day].[month].[year]"))
        .unwrap_or_default()
}

fn format_generated(dt: PrimitiveDateTime) -> String {
    dt.format(format_description!(
        "[day].[month].[year] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

fn header(title: &str, generated: PrimitiveDateTime) -> Vec<String> {
    vec![
        "=".repeat(WIDE),
        title.to_string(),
        "=".repeat(WIDE),
        String::new(),
        format!("Generated: {}", format_generated(generated)),
        String::new(),
    ]
}

pub fn render_text(kind: ReportKind, data: &ReportData) -> Vec<String> {
    let mut lines = header(kind.title(), data.generated);
    match kind {
        ReportKind::Full => full_body(data, &mut lines),
        ReportKind::Status => status_body(data, &mut lines),
        ReportKind::Category => category_body(data, &mut lines),
        ReportKind::Financial => financial_body(data, &mut lines),
    }
    lines
}

fn full_body(data: &ReportData, lines: &mut Vec<String>) {
    let stats = &data.stats;
    lines.push("STATISTICS:".into());
    lines.push("-".repeat(NARROW));
    lines.push(format!("Total proposals: {}", stats.total));
    lines.push(format!("Total cost: {}", money(stats.total_cost)));
    lines.push(String::new());

    lines.push("By status:".into());
    lines.push("-".repeat(NARROW));
    for b in &stats.by_status {
        lines.push(format!(
            "  {:<20} {:>3} ({:>5.1}%)",
            b.key.label(),
            b.count,
            b.share(stats.total)
        ));
    }

    lines.push(String::new());
    lines.push("By category:".into());
    lines.push("-".repeat(NARROW));
    for b in &stats.by_category {
        lines.push(format!("  {:<30} {:>3}", b.key.label(), b.count));
    }

    lines.push(String::new());
    lines.push("By priority:".into());
    lines.push("-".repeat(NARROW));
    for b in &stats.by_priority {
        lines.push(format!("  {:<10} {:>3}", b.key.label(), b.count));
    }

    lines.push(String::new());
    lines.push("=".repeat(WIDE));
    lines.push("PROPOSALS:".into());
    lines.push("=".repeat(WIDE));
    lines.push(String::new());

    for (i, p) in data.proposals.iter().enumerate() {
        let f = &p.fields;
        lines.push(format!("[{}] ID: {}", i + 1, p.id));
        lines.push(format!("    Title: {}", f.title));
        lines.push(format!("    Category: {}", f.category));
        lines.push(format!("    Status: {}", f.status));
        lines.push(format!(
            "    Author: {} | Department: {}",
            f.author, f.department
        ));
        lines.push(format!(
            "    Priority: {} | Cost: {}",
            f.priority,
            money(f.estimated_cost)
        ));
        lines.push(format!(
            "    Term: {} | Date: {}",
            or_unspecified(&f.implementation_time),
            format_date(p.created_date)
        ));
        lines.push(format!(
            "    Description: {}",
            preview(&f.description, DESCRIPTION_PREVIEW)
        ));
        if !f.expected_benefit.is_empty() {
            lines.push(format!(
                "    Expected benefit: {}",
                preview(&f.expected_benefit, BENEFIT_PREVIEW)
            ));
        }
        lines.push("-".repeat(WIDE));
    }

    lines.push(String::new());
    lines.push(format!("Total records: {}", data.proposals.len()));
}

fn status_body(data: &ReportData, lines: &mut Vec<String>) {
    let stats = &data.stats;
    lines.push("SUMMARY BY STATUS:".into());
    lines.push("-".repeat(WIDE));
    lines.push(format!(
        "{:<25} {:>6} {:>8} {:>16}",
        "Status", "Count", "Share,%", "Cost"
    ));
    lines.push("-".repeat(WIDE));
    let mut cost = 0.0;
    for b in &stats.by_status {
        cost += b.cost;
        lines.push(format!(
            "{:<25} {:>6} {:>7.1}% {:>12} {CURRENCY}",
            b.key.label(),
            b.count,
            b.share(stats.total),
            group_thousands(b.cost)
        ));
    }
    lines.push("-".repeat(WIDE));
    lines.push(format!(
        "{:<25} {:>6} {:>8} {:>12} {CURRENCY}",
        "TOTAL:",
        stats.total,
        "100.0%",
        group_thousands(cost)
    ));
}

fn category_body(data: &ReportData, lines: &mut Vec<String>) {
    let stats = &data.stats;
    lines.push("SUMMARY BY CATEGORY:".into());
    lines.push("-".repeat(WIDE));
    lines.push(format!("{:<30} {:>6} {:>16}", "Category", "Count", "Cost"));
    lines.push("-".repeat(WIDE));
    for b in &stats.by_category {
        lines.push(format!(
            "{:<30} {:>6} {:>12} {CURRENCY}",
            b.key.label(),
            b.count,
            group_thousands(b.cost)
        ));
    }
}

fn financial_body(data: &ReportData, lines: &mut Vec<String>) {
    let s = metrics::cost_summary(&data.costs());
    lines.push("FINANCIAL SUMMARY:".into());
    lines.push("-".repeat(50));
    lines.push(format!("Total cost of all proposals: {}", money(s.total)));
    lines.push(format!("Average proposal cost:       {}", money(s.mean)));
    lines.push(format!("Median proposal cost:        {}", money(s.median)));
    lines.push(format!("Maximum cost:                {}", money(s.max)));
    lines.push(format!(
        "Minimum cost:                {}",
        money(s.min_positive)
    ));
    lines.push(format!("Number of proposals:         {}", s.count));
    lines.push(String::new());
    lines.push("COSTS BY PROPOSAL:".into());
    lines.push("-".repeat(50));
    for row in cost_rows(data) {
        lines.push(format!(
            "  #{:<4} {:<40} {:>12} {CURRENCY}",
            row.id,
            preview(&row.title, 37),
            group_thousands(row.estimated_cost)
        ));
    }
}

/// Single proposal card.
pub fn render_card(p: &Proposal, generated: PrimitiveDateTime) -> Vec<String> {
    let f = &p.fields;
    let created = p
        .created_date
        .format(format_description!("[day].[month].[year] [hour]:[minute]"))
        .unwrap_or_default();
    let cost = if f.estimated_cost > 0.0 {
        money(f.estimated_cost)
    } else {
        "Not specified".to_string()
    };

    let mut lines = vec![
        format!("System enhancement proposal #{}", p.id),
        "=".repeat(WIDE),
        format!("Title:               {}", f.title),
        format!("Category:            {}", f.category),
        format!("Status:              {}", f.status),
        format!("Author:              {}", f.author),
        format!("Department:          {}", f.department),
        format!("Priority:            {}", f.priority),
        format!("Created:             {created}"),
        format!(
            "Implementation time: {}",
            or_unspecified(&f.implementation_time)
        ),
        format!("Cost:                {cost}"),
        String::new(),
        "Description:".to_string(),
        f.description.clone(),
    ];
    if !f.expected_benefit.is_empty() {
        lines.push(String::new());
        lines.push("Expected benefit:".to_string());
        lines.push(f.expected_benefit.clone());
    }
    if !f.risks.is_empty() {
        lines.push(String::new());
        lines.push("Potential risks:".to_string());
        lines.push(f.risks.clone());
    }
    lines.push(String::new());
    lines.push(format!("Generated: {}", format_generated(generated)));
    lines
}

/// Flat proposal record for CSV.
#[derive(Debug, Serialize)]
struct ProposalRow<'a> {
    id: i64,
    title: &'a str,
    description: &'a str,
    category: &'static str,
    status: &'static str,
    author: &'a str,
    department: &'a str,
    priority: u8,
    created_date: String,
    expected_benefit: &'a str,
    estimated_cost: f64,
    implementation_time: &'a str,
    risks: &'a str,
}

impl<'a> From<&'a Proposal> for ProposalRow<'a> {
    fn from(p: &'a Proposal) -> Self {
        let f = &p.fields;
        Self {
            id: p.id,
            title: &f.title,
            description: &f.description,
            category: f.category.key(),
            status: f.status.key(),
            author: &f.author,
            department: &f.department,
            priority: f.priority.level(),
            created_date: p.created_date.format(TIMESTAMP_FORMAT).unwrap_or_default(),
            expected_benefit: &f.expected_benefit,
            estimated_cost: f.estimated_cost,
            implementation_time: &f.implementation_time,
            risks: &f.risks,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusRow {
    status: &'static str,
    count: i64,
    share_percent: f64,
    cost: f64,
}

#[derive(Debug, Serialize)]
struct CategoryRow {
    category: &'static str,
    count: i64,
    cost: f64,
}

#[derive(Debug, Clone, Serialize)]
struct CostRow {
    id: i64,
    title: String,
    status: Status,
    estimated_cost: f64,
}

/// Highest cost first; ties keep list order.
fn cost_rows(data: &ReportData) -> Vec<CostRow> {
    let mut rows: Vec<CostRow> = data
        .proposals
        .iter()
        .map(|p| CostRow {
            id: p.id,
            title: p.fields.title.clone(),
            status: p.fields.status,
            estimated_cost: p.fields.estimated_cost,
        })
        .collect();
    rows.sort_by(|a, b| b.estimated_cost.total_cmp(&a.estimated_cost));
    rows
}

fn status_rows(stats: &Statistics) -> Vec<StatusRow> {
    stats
        .by_status
        .iter()
        .map(|b| StatusRow {
            status: b.key.key(),
            count: b.count,
            share_percent: b.share(stats.total),
            cost: b.cost,
        })
        .collect()
}

fn category_rows(stats: &Statistics) -> Vec<CategoryRow> {
    stats
        .by_category
        .iter()
        .map(|b| CategoryRow {
            category: b.key.key(),
            count: b.count,
            cost: b.cost,
        })
        .collect()
}

fn generated_stamp(dt: PrimitiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).unwrap_or_default()
}

#[derive(Serialize)]
struct FullJson<'a> {
    generated: String,
    statistics: &'a Statistics,
    proposals: &'a [Proposal],
}

#[derive(Serialize)]
struct StatusJson {
    generated: String,
    total: i64,
    statuses: Vec<StatusRow>,
}

#[derive(Serialize)]
struct CategoryJson {
    generated: String,
    total: i64,
    categories: Vec<CategoryRow>,
}

#[derive(Serialize)]
struct FinancialJson {
    generated: String,
    summary: CostSummary,
    proposals: Vec<CostRow>,
}

pub fn render_json(kind: ReportKind, data: &ReportData) -> Result<serde_json::Value> {
    let generated = generated_stamp(data.generated);
    let value = match kind {
        ReportKind::Full => serde_json::to_value(FullJson {
            generated,
            statistics: &data.stats,
            proposals: &data.proposals,
        })?,
        ReportKind::Status => serde_json::to_value(StatusJson {
            generated,
            total: data.stats.total,
            statuses: status_rows(&data.stats),
        })?,
        ReportKind::Category => serde_json::to_value(CategoryJson {
            generated,
            total: data.stats.total,
            categories: category_rows(&data.stats),
        })?,
        ReportKind::Financial => serde_json::to_value(FinancialJson {
            generated,
            summary: metrics::cost_summary(&data.costs()),
            proposals: cost_rows(data),
        })?,
    };
    Ok(value)
}

/// Render the report and write it under `dir`. Returns the file path.
pub fn write_report(
    kind: ReportKind,
    format: ReportFormat,
    data: &ReportData,
    dir: &Path,
) -> Result<PathBuf> {
    let path = storage::report_path(dir, kind.file_stem(), format.extension(), data.generated)?;
    match format {
        ReportFormat::Text => storage::write_text(&path, &render_text(kind, data))?,
        ReportFormat::Json => storage::export_json(&path, &render_json(kind, data)?)?,
        ReportFormat::Csv => match kind {
            ReportKind::Full => {
                let rows: Vec<ProposalRow> = data.proposals.iter().map(ProposalRow::from).collect();
                storage::export_csv(&path, &rows)?
            }
            ReportKind::Status => storage::export_csv(&path, &status_rows(&data.stats))?,
            ReportKind::Category => storage::export_csv(&path, &category_rows(&data.stats))?,
            ReportKind::Financial => storage::export_csv(&path, &cost_rows(data))?,
        },
    }
    tracing::info!(path = %path.display(), ?kind, ?format, "report written");
    Ok(path)
}

/// Write a single proposal card under `dir`.
pub fn write_card(
    p: &Proposal,
    format: ReportFormat,
    dir: &Path,
    now: PrimitiveDateTime,
) -> Result<PathBuf> {
    let path = storage::report_path(dir, &format!("proposal_{}", p.id), format.extension(), now)?;
    match format {
        ReportFormat::Text => storage::write_text(&path, &render_card(p, now))?,
        ReportFormat::Json => storage::export_json(&path, p)?,
        ReportFormat::Csv => storage::export_csv(&path, &[ProposalRow::from(p)])?,
    }
    tracing::info!(path = %path.display(), id = p.id, "proposal card written");
    Ok(path)
}
