//! The `transparency members` and `add-member` commands.

use anyhow::Result;
use comfy_table::Cell;

use transparency_core::model::ProjectId;
use transparency_store::{OutputFormat, TransparencyConfig};

use super::{format_optional, format_time, new_table, open_service, print_json};

pub async fn list(config: &TransparencyConfig, project: u64, format: OutputFormat) -> Result<()> {
    let service = open_service(config).await?;
    let members = service.list_members(ProjectId(project)).await?;

    if format == OutputFormat::Json {
        return print_json(&members);
    }
    if members.is_empty() {
        println!("No members.");
        return Ok(());
    }

    let mut table = new_table(format);
    table.set_header(vec!["ID", "Name", "Role", "Email", "Latest", "Scored at"]);
    for member in &members {
        table.add_row(vec![
            Cell::new(member.id),
            Cell::new(&member.name),
            Cell::new(member.role),
            Cell::new(format_optional(member.email.as_deref())),
            Cell::new(format_optional(member.latest_score)),
            Cell::new(format_optional(member.latest_score_at.as_ref().map(format_time))),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn add(
    config: &TransparencyConfig,
    project: u64,
    name: String,
    role: String,
    email: Option<String>,
) -> Result<()> {
    let service = open_service(config).await?;
    let member = service
        .create_member(ProjectId(project), &name, &role, email)
        .await?;
    println!(
        "Added member {}: {} ({}) to project {}",
        member.id, member.name, member.role, member.project_id
    );
    Ok(())
}
