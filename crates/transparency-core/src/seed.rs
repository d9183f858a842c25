//! TOML seed file parser.
//!
//! Seed files describe projects, their members and historical scores. Scores
//! carry a `days_ago` offset so the same file yields a fresh-looking history
//! whenever it is applied.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Role, ScoreValue};

/// Intermediate TOML structure for parsing seed files.
#[derive(Debug, Deserialize)]
struct TomlSeedFile {
    #[serde(default)]
    projects: Vec<TomlProject>,
}

#[derive(Debug, Deserialize)]
struct TomlProject {
    name: String,
    document_url: String,
    #[serde(default)]
    members: Vec<TomlMember>,
}

#[derive(Debug, Deserialize)]
struct TomlMember {
    name: String,
    role: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    scores: Vec<TomlScore>,
}

#[derive(Debug, Deserialize)]
struct TomlScore {
    value: f64,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    days_ago: u32,
}

/// Parsed seed data.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub projects: Vec<SeedProject>,
}

#[derive(Debug, Clone)]
pub struct SeedProject {
    pub name: String,
    pub document_url: String,
    pub members: Vec<SeedMember>,
}

#[derive(Debug, Clone)]
pub struct SeedMember {
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
    pub scores: Vec<SeedScore>,
}

#[derive(Debug, Clone)]
pub struct SeedScore {
    pub value: ScoreValue,
    pub comment: Option<String>,
    /// How many days before the seeding time the score was submitted.
    pub days_ago: u32,
}

impl SeedData {
    pub fn member_count(&self) -> usize {
        self.projects.iter().map(|p| p.members.len()).sum()
    }

    pub fn score_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| &p.members)
            .map(|m| m.scores.len())
            .sum()
    }
}

/// Parse a seed file.
pub fn parse_seed(path: &Path) -> Result<SeedData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file: {}", path.display()))?;

    parse_seed_str(&content, path)
}

/// Parse seed TOML from a string (useful for testing).
pub fn parse_seed_str(content: &str, source_path: &Path) -> Result<SeedData> {
    let parsed: TomlSeedFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let projects = parsed
        .projects
        .into_iter()
        .map(|p| {
            let members = p
                .members
                .into_iter()
                .map(|m| {
                    let role: Role = m
                        .role
                        .parse()
                        .with_context(|| format!("member '{}'", m.name))?;
                    let scores = m
                        .scores
                        .into_iter()
                        .map(|s| {
                            Ok(SeedScore {
                                value: ScoreValue::new(s.value)
                                    .with_context(|| format!("member '{}'", m.name))?,
                                comment: s.comment,
                                days_ago: s.days_ago,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(SeedMember {
                        name: m.name,
                        role,
                        email: m.email,
                        scores,
                    })
                })
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("project '{}'", p.name))?;

            Ok(SeedProject {
                name: p.name,
                document_url: p.document_url,
                members,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SeedData { projects })
}

/// The built-in demo data set.
pub fn demo_seed() -> Result<SeedData> {
    parse_seed_str(DEMO_SEED, Path::new("<demo>"))
}

/// Offsets beyond this many days (about a century) are flagged by validation.
pub const MAX_DAYS_AGO: u32 = 36_500;

/// A warning from seed validation.
#[derive(Debug, Clone)]
pub struct SeedWarning {
    /// The project name (if applicable).
    pub project: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate seed data for common issues.
pub fn validate_seed(seed: &SeedData) -> Vec<SeedWarning> {
    let mut warnings = Vec::new();

    if seed.projects.is_empty() {
        warnings.push(SeedWarning {
            project: None,
            message: "seed file contains no projects".into(),
        });
    }

    let mut seen_projects = HashSet::new();
    for project in &seed.projects {
        let warn = |message: String| SeedWarning {
            project: Some(project.name.clone()),
            message,
        };

        if project.name.trim().is_empty() {
            warnings.push(warn("project name is empty".into()));
        }
        if project.document_url.trim().is_empty() {
            warnings.push(warn("document_url is empty".into()));
        }
        if !seen_projects.insert(project.name.as_str()) {
            warnings.push(warn(format!("duplicate project name: {}", project.name)));
        }
        if project.members.is_empty() {
            warnings.push(warn("project has no members".into()));
        }

        let mut seen_members = HashSet::new();
        for member in &project.members {
            if member.name.trim().is_empty() {
                warnings.push(warn("member name is empty".into()));
            }
            if !seen_members.insert(member.name.as_str()) {
                warnings.push(warn(format!("duplicate member name: {}", member.name)));
            }
            if let Some(days) = member
                .scores
                .iter()
                .map(|s| s.days_ago)
                .filter(|d| *d > MAX_DAYS_AGO)
                .max()
            {
                warnings.push(warn(format!(
                    "member '{}' has a score {days} days ago (more than {MAX_DAYS_AGO})",
                    member.name
                )));
            }
            if member.scores.is_empty() {
                warnings.push(warn(format!(
                    "member '{}' has no scores and will not count toward the average",
                    member.name
                )));
            }
        }
    }

    warnings
}

/// Demo data: three projects with five weekly scores per member.
pub const DEMO_SEED: &str = r#"# Demo data: three projects, weekly scores over five weeks.

[[projects]]
name = "E-commerce Site Renewal"
document_url = "https://docs.google.com/document/d/example1"

[[projects.members]]
name = "Taro Yamada"
role = "PM"
email = "yamada@example.com"
scores = [
    { value = 92, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 94, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 95, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 93, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 96, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Hanako Sato"
role = "PL"
email = "sato@example.com"
scores = [
    { value = 88, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 90, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 92, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 91, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 93, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Ichiro Suzuki"
role = "Member"
email = "suzuki@example.com"
scores = [
    { value = 75, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 78, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 82, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 85, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 88, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Misaki Tanaka"
role = "Member"
email = "tanaka@example.com"
scores = [
    { value = 82, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 84, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 86, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 87, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 90, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Kenta Takahashi"
role = "Member"
email = "takahashi@example.com"
scores = [
    { value = 70, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 72, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 76, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 80, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 84, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects]]
name = "Internal Operations App"
document_url = "https://docs.google.com/document/d/example2"

[[projects.members]]
name = "Makoto Ito"
role = "PM"
email = "ito@example.com"
scores = [
    { value = 90, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 91, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 89, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 92, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 94, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Yuko Watanabe"
role = "PL"
email = "watanabe@example.com"
scores = [
    { value = 85, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 87, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 88, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 90, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 91, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Daisuke Nakamura"
role = "Member"
email = "nakamura@example.com"
scores = [
    { value = 78, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 81, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 83, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 85, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 87, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Akari Kobayashi"
role = "Member"
email = "kobayashi@example.com"
scores = [
    { value = 80, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 82, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 84, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 86, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 88, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects]]
name = "Data Analytics Platform"
document_url = "https://docs.google.com/document/d/example3"

[[projects.members]]
name = "Yusuke Kato"
role = "PL"
email = "kato@example.com"
scores = [
    { value = 91, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 92, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 90, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 93, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 94, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Mai Yoshida"
role = "Member"
email = "yoshida@example.com"
scores = [
    { value = 83, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 85, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 87, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 88, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 90, comment = "Week 5 evaluation", days_ago = 0 },
]

[[projects.members]]
name = "Takuya Yamaguchi"
role = "Member"
email = "yamaguchi@example.com"
scores = [
    { value = 76, comment = "Week 1 evaluation", days_ago = 28 },
    { value = 79, comment = "Week 2 evaluation", days_ago = 21 },
    { value = 82, comment = "Week 3 evaluation", days_ago = 14 },
    { value = 84, comment = "Week 4 evaluation", days_ago = 7 },
    { value = 86, comment = "Week 5 evaluation", days_ago = 0 },
]
"#;
