//! The `transparency projects`, `create-project` and `show-project` commands.

use anyhow::Result;
use comfy_table::Cell;

use transparency_core::model::ProjectId;
use transparency_store::{OutputFormat, TransparencyConfig};

use super::{format_optional, format_time, new_table, open_service, print_json};

pub async fn list(config: &TransparencyConfig, format: OutputFormat) -> Result<()> {
    let service = open_service(config).await?;
    let projects = service.list_projects().await?;

    if format == OutputFormat::Json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects. Run `transparency create-project` or `transparency seed`.");
        return Ok(());
    }

    let mut table = new_table(format);
    table.set_header(vec!["ID", "Name", "Document", "Created"]);
    for project in &projects {
        table.add_row(vec![
            Cell::new(project.id),
            Cell::new(&project.name),
            Cell::new(&project.document_url),
            Cell::new(format_time(&project.created_at)),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn create(config: &TransparencyConfig, name: String, document_url: String) -> Result<()> {
    let service = open_service(config).await?;
    let project = service.create_project(&name, &document_url).await?;
    println!("Created project {}: {}", project.id, project.name);
    Ok(())
}

pub async fn show(config: &TransparencyConfig, project: u64, format: OutputFormat) -> Result<()> {
    let service = open_service(config).await?;
    let detail = service.get_project(ProjectId(project)).await?;

    if format == OutputFormat::Json {
        return print_json(&detail);
    }

    println!("{} (#{})", detail.project.name, detail.project.id);
    println!("Document: {}", detail.project.document_url);
    println!("Created:  {}", format_time(&detail.project.created_at));
    if detail.members.is_empty() {
        println!("\nNo members.");
        return Ok(());
    }

    let mut table = new_table(format);
    table.set_header(vec!["ID", "Name", "Role", "Weight", "Email"]);
    for member in &detail.members {
        table.add_row(vec![
            Cell::new(member.id),
            Cell::new(&member.name),
            Cell::new(member.role),
            Cell::new(member.role.weight()),
            Cell::new(format_optional(member.email.as_deref())),
        ]);
    }
    println!("\n{table}");
    Ok(())
}
