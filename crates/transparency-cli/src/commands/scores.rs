//! The `transparency submit-score` and `scores` commands.

use anyhow::Result;
use comfy_table::Cell;

use transparency_core::model::MemberId;
use transparency_store::{OutputFormat, TransparencyConfig};

use super::{format_optional, format_time, new_table, open_service, print_json};

pub async fn submit(
    config: &TransparencyConfig,
    member: u64,
    value: f64,
    comment: Option<String>,
) -> Result<()> {
    let service = open_service(config).await?;
    let score = service.submit_score(MemberId(member), value, comment).await?;
    println!(
        "Recorded score {} for member {} at {}",
        score.value,
        score.member_id,
        format_time(&score.created_at)
    );
    Ok(())
}

pub async fn list(config: &TransparencyConfig, member: u64, format: OutputFormat) -> Result<()> {
    let service = open_service(config).await?;
    let history = service.list_scores(MemberId(member)).await?;

    if format == OutputFormat::Json {
        return print_json(&history);
    }

    println!(
        "{} ({}, #{})",
        history.member.name, history.member.role, history.member.id
    );
    if history.scores.is_empty() {
        println!("\nNo scores.");
        return Ok(());
    }

    let mut table = new_table(format);
    table.set_header(vec!["ID", "Score", "Comment", "Submitted"]);
    for score in &history.scores {
        table.add_row(vec![
            Cell::new(score.id),
            Cell::new(score.value),
            Cell::new(format_optional(score.comment.as_deref())),
            Cell::new(format_time(&score.created_at)),
        ]);
    }
    println!("\n{table}");
    Ok(())
}
