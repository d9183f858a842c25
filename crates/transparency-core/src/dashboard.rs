//! Dashboard read model with JSON persistence and Markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{MemberStanding, ProjectAggregate};
use crate::model::{MemberId, Project, ProjectId, Role, ScoreValue};
use crate::statistics::TimelinePoint;

/// The full dashboard for one project.
///
/// `weighted_average` and `last_updated` are omitted from JSON when the
/// project has no scores at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub project: ProjectInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub members_summary: Vec<MemberSummary>,
    pub timeline: Vec<TimelinePoint>,
}

/// Project metadata shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub name: String,
    pub document_url: String,
}

/// One row of the member table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score: Option<ScoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score_at: Option<DateTime<Utc>>,
}

impl From<&Project> for ProjectInfo {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            document_url: project.document_url.clone(),
        }
    }
}

impl From<MemberStanding> for MemberSummary {
    fn from(standing: MemberStanding) -> Self {
        let (latest_score, latest_comment, latest_score_at) = match standing.latest {
            Some(score) => (Some(score.value), score.comment, Some(score.created_at)),
            None => (None, None, None),
        };
        Self {
            id: standing.member.id,
            name: standing.member.name,
            role: standing.member.role,
            weight: standing.weight,
            latest_score,
            latest_comment,
            latest_score_at,
        }
    }
}

impl From<ProjectAggregate> for Dashboard {
    fn from(aggregate: ProjectAggregate) -> Self {
        Self {
            project: ProjectInfo::from(&aggregate.project),
            weighted_average: aggregate.weighted_average,
            last_updated: aggregate.last_updated,
            members_summary: aggregate
                .standings
                .into_iter()
                .map(MemberSummary::from)
                .collect(),
            timeline: aggregate.timeline,
        }
    }
}

impl Dashboard {
    /// Save the dashboard as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize dashboard")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write dashboard to {}", path.display()))?;
        Ok(())
    }

    /// Load a dashboard from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard from {}", path.display()))?;
        let dashboard: Dashboard =
            serde_json::from_str(&content).context("failed to parse dashboard JSON")?;
        Ok(dashboard)
    }

    /// Format the dashboard as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.project.name));
        md.push_str(&format!("Document: {}\n\n", self.project.document_url));
        md.push_str(&format!(
            "**Weighted average:** {}\n\n",
            format_average(self.weighted_average)
        ));
        if let Some(at) = self.last_updated {
            md.push_str(&format!("**Last updated:** {}\n\n", at.format("%Y-%m-%d %H:%M UTC")));
        }

        md.push_str("### Members\n\n");
        if self.members_summary.is_empty() {
            md.push_str("No members.\n\n");
        } else {
            md.push_str("| Member | Role | Weight | Latest | Comment |\n");
            md.push_str("|--------|------|--------|--------|---------|\n");
            for m in &self.members_summary {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    m.name,
                    m.role,
                    m.weight,
                    m.latest_score
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    m.latest_comment.as_deref().unwrap_or(""),
                ));
            }
            md.push('\n');
        }

        md.push_str("### Timeline\n\n");
        if self.timeline.is_empty() {
            md.push_str("No data.\n");
        } else {
            md.push_str("| Date | Weighted average |\n");
            md.push_str("|------|------------------|\n");
            for point in &self.timeline {
                md.push_str(&format!(
                    "| {} | {:.1} |\n",
                    point.date, point.weighted_average
                ));
            }
        }

        md
    }
}

/// Render an average to one decimal place, or "no data" when absent.
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{avg:.1}"),
        None => "no data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, Score, ScoreId};
    use chrono::{NaiveDate, TimeZone};

    fn project() -> Project {
        Project {
            id: ProjectId(1),
            name: "Renewal".into(),
            document_url: "https://docs.example.com/renewal".into(),
            created_at: Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap(),
        }
    }

    fn standing(id: u64, role: Role, latest: Option<f64>) -> MemberStanding {
        let at = Utc.with_ymd_and_hms(2024, 11, 8, 12, 0, 0).unwrap();
        MemberStanding {
            member: Member {
                id: MemberId(id),
                project_id: ProjectId(1),
                name: format!("m{id}"),
                role,
                email: None,
                created_at: at,
            },
            weight: role.weight(),
            latest: latest.map(|v| Score {
                id: ScoreId(id),
                member_id: MemberId(id),
                value: ScoreValue::new(v).unwrap(),
                comment: Some("weekly".into()),
                created_at: at,
            }),
        }
    }

    fn make_dashboard(with_scores: bool) -> Dashboard {
        let latest = with_scores.then_some(75.0);
        Dashboard::from(ProjectAggregate {
            project: project(),
            standings: vec![standing(1, Role::Pl, latest), standing(2, Role::Member, None)],
            weighted_average: latest,
            last_updated: with_scores
                .then(|| Utc.with_ymd_and_hms(2024, 11, 8, 12, 0, 0).unwrap()),
            timeline: if with_scores {
                vec![TimelinePoint {
                    date: NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
                    weighted_average: 75.0,
                }]
            } else {
                vec![]
            },
        })
    }

    #[test]
    fn assembles_member_rows() {
        let dashboard = make_dashboard(true);
        assert_eq!(dashboard.project.name, "Renewal");
        assert_eq!(dashboard.members_summary.len(), 2);
        let lead = &dashboard.members_summary[0];
        assert_eq!(lead.weight, 3);
        assert_eq!(lead.latest_score.map(|v| v.get()), Some(75.0));
        assert_eq!(lead.latest_comment.as_deref(), Some("weekly"));
        let member = &dashboard.members_summary[1];
        assert!(member.latest_score.is_none());
        assert!(member.latest_score_at.is_none());
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let json = serde_json::to_value(make_dashboard(false)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("weighted_average"));
        assert!(!obj.contains_key("last_updated"));
        assert_eq!(obj["timeline"].as_array().unwrap().len(), 0);

        let json = serde_json::to_value(make_dashboard(true)).unwrap();
        assert_eq!(json["weighted_average"], 75.0);
        assert_eq!(json["timeline"][0]["date"], "2024-11-08");
    }

    #[test]
    fn json_roundtrip() {
        let dashboard = make_dashboard(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");

        dashboard.save_json(&path).unwrap();
        let loaded = Dashboard::load_json(&path).unwrap();

        assert_eq!(loaded.project.id, ProjectId(1));
        assert_eq!(loaded.weighted_average, Some(75.0));
        assert_eq!(loaded.timeline, dashboard.timeline);
    }

    #[test]
    fn save_into_blocked_directory_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = make_dashboard(true)
            .save_json(&blocker.join("dash.json"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("failed to create directory {}", blocker.display())
        );
    }

    #[test]
    fn markdown_output() {
        let md = make_dashboard(true).to_markdown();
        assert!(md.contains("## Renewal"));
        assert!(md.contains("75.0"));
        assert!(md.contains("| m2 | Member | 1 | - |"));

        let empty = make_dashboard(false).to_markdown();
        assert!(empty.contains("no data"));
        assert!(empty.contains("No data."));
    }

    #[test]
    fn average_formatting() {
        assert_eq!(format_average(Some(91.26)), "91.3");
        assert_eq!(format_average(Some(45.0)), "45.0");
        assert_eq!(format_average(None), "no data");
    }
}
