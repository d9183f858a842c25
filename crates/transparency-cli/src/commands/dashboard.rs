//! The `transparency dashboard` and `render` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Cell;

use transparency_core::dashboard::{format_average, Dashboard};
use transparency_core::model::ProjectId;
use transparency_store::{OutputFormat, TransparencyConfig};

use super::{format_optional, format_time, new_table, open_service, print_json};

pub async fn execute(
    config: &TransparencyConfig,
    project: u64,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = open_service(config).await?;
    let dashboard = service.get_dashboard(ProjectId(project)).await?;

    if let Some(path) = output {
        dashboard.save_json(&path)?;
        eprintln!("Dashboard saved to: {}", path.display());
    }

    print_dashboard(&dashboard, format)
}

pub fn render(input: PathBuf, format: OutputFormat) -> Result<()> {
    let dashboard = Dashboard::load_json(&input)?;
    print_dashboard(&dashboard, format)
}

fn print_dashboard(dashboard: &Dashboard, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(dashboard),
        OutputFormat::Markdown => {
            print!("{}", dashboard.to_markdown());
            Ok(())
        }
        OutputFormat::Text => {
            print_text(dashboard);
            Ok(())
        }
    }
}

fn print_text(dashboard: &Dashboard) {
    println!("{} (#{})", dashboard.project.name, dashboard.project.id);
    println!("Document:         {}", dashboard.project.document_url);
    println!(
        "Weighted average: {}",
        format_average(dashboard.weighted_average)
    );
    if let Some(at) = &dashboard.last_updated {
        println!("Last updated:     {}", format_time(at));
    }

    if dashboard.members_summary.is_empty() {
        println!("\nNo members.");
    } else {
        let mut table = new_table(OutputFormat::Text);
        table.set_header(vec!["Member", "Role", "Weight", "Latest", "Comment", "Scored at"]);
        for m in &dashboard.members_summary {
            table.add_row(vec![
                Cell::new(&m.name),
                Cell::new(m.role),
                Cell::new(m.weight),
                Cell::new(format_optional(m.latest_score)),
                Cell::new(m.latest_comment.as_deref().unwrap_or("")),
                Cell::new(format_optional(m.latest_score_at.as_ref().map(format_time))),
            ]);
        }
        println!("\n{table}");
    }

    if dashboard.timeline.is_empty() {
        println!("\nTimeline: no data.");
    } else {
        let mut table = new_table(OutputFormat::Text);
        table.set_header(vec!["Date", "Weighted average"]);
        for point in &dashboard.timeline {
            table.add_row(vec![
                Cell::new(point.date),
                Cell::new(format!("{:.1}", point.weighted_average)),
            ]);
        }
        println!("\n{table}");
    }
}
