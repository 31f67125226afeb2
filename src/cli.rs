use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORG: &str = "kpmg-global-technology-and-knowledge";
pub const DEFAULT_PR_REPO: &str = "digital-matrix-app";
pub const DEFAULT_ISSUES_REPO: &str = "Digital-matrix-app";
pub const DEFAULT_PROJECTS: [(u32, &str); 4] = [
  (12, "Workbench Program Status"),
  (18, "Workbench-Platform-Americas-Streams"),
  (20, "Workbench-Platform-ASPAC-Streams"),
  (27, "Workbench-Platform-EMEA-Streams"),
];
pub const DEFAULT_MILESTONES: [&str; 3] = ["Release 1.6.0", "Release 1.7.0", "Release 1.8.0"];

#[derive(Parser, Debug)]
#[command(
    name = "gh-status-report",
    version,
    about = "Export GitHub pull requests and project boards to spreadsheets and release notes",
    long_about = None
)]
pub struct Cli {
  /// File holding the GitHub access token (whitespace-trimmed)
  #[arg(long, global = true, default_value = "github_token.txt")]
  pub token_file: String,

  /// Directory for the generated workbook / notes
  #[arg(long, global = true, default_value = ".")]
  pub out_dir: String,

  /// GitHub API base URL (GraphQL lives at <base>/graphql)
  #[arg(long, global = true, default_value = "https://api.github.com")]
  pub api_base: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used in output file names (hidden; tests only)
  #[arg(long = "now-override", global = true, hide = true)]
  pub now_override: Option<String>,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Every pull request of one repository, one row each
  PullRequests(PullRequestsArgs),
  /// One sheet per project board with derived label columns
  ProjectStatus(ProjectArgs),
  /// Project status plus release/defect/feature sheets and a Markdown release note
  ReleaseNotes(ReleaseArgs),
}

#[derive(Args, Debug)]
pub struct PullRequestsArgs {
  #[arg(long, default_value = DEFAULT_ORG)]
  pub owner: String,

  #[arg(long, default_value = DEFAULT_PR_REPO)]
  pub repo: String,

  /// Also export the /issues listing into a second sheet
  #[arg(long)]
  pub include_issues: bool,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
  /// Organization owning the project boards
  #[arg(long, default_value = DEFAULT_ORG)]
  pub org: String,

  /// Project board as NUMBER=TITLE (repeatable; default: the four Workbench boards)
  #[arg(long = "project", value_name = "NUMBER=TITLE")]
  pub projects: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ReleaseArgs {
  #[command(flatten)]
  pub project: ProjectArgs,

  /// Milestone title to include in "Release items" (repeatable, exact match)
  #[arg(long = "milestone", value_name = "NAME")]
  pub milestones: Vec<String>,

  /// Owner of the repository holding the feature issues
  #[arg(long, default_value = DEFAULT_ORG)]
  pub issues_owner: String,

  /// Repository holding the feature issues
  #[arg(long, default_value = DEFAULT_ISSUES_REPO)]
  pub issues_repo: String,

  /// Release notes file name, written inside --out-dir
  #[arg(long, default_value = "Release_Notes.md")]
  pub notes_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
  pub number: u32,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestsConfig {
  pub owner: String,
  pub repo: String,
  pub include_issues: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsConfig {
  pub org: String,
  pub projects: Vec<ProjectSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
  pub projects: ProjectsConfig,
  pub milestones: Vec<String>,
  pub issues_owner: String,
  pub issues_repo: String,
  pub notes_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReportConfig {
  PullRequests(PullRequestsConfig),
  ProjectStatus(ProjectsConfig),
  ReleaseNotes(ReleaseConfig),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub token_file: String,
  pub out_dir: String,
  pub api_base: String,
  pub now_override: Option<String>,
  pub report: ReportConfig,
}

/// Parse `NUMBER=TITLE`; the title may itself contain `=`.
pub fn parse_project_spec(raw: &str) -> Result<ProjectSpec> {
  let Some((num, title)) = raw.split_once('=') else {
    bail!("invalid --project {:?}: expected NUMBER=TITLE", raw);
  };

  let number = num
    .trim()
    .parse::<u32>()
    .with_context(|| format!("invalid --project {:?}: {:?} is not a project number", raw, num.trim()))?;

  let title = title.trim();
  if title.is_empty() {
    bail!("invalid --project {:?}: title is empty", raw);
  }

  Ok(ProjectSpec {
    number,
    title: title.to_string(),
  })
}

fn normalize_projects(args: ProjectArgs) -> Result<ProjectsConfig> {
  let projects = if args.projects.is_empty() {
    DEFAULT_PROJECTS
      .iter()
      .map(|(number, title)| ProjectSpec {
        number: *number,
        title: title.to_string(),
      })
      .collect()
  } else {
    args
      .projects
      .iter()
      .map(|raw| parse_project_spec(raw))
      .collect::<Result<Vec<_>>>()?
  };

  let mut seen = HashSet::new();
  for p in &projects {
    if !seen.insert(p.number) {
      bail!("duplicate --project number {}", p.number);
    }
  }

  Ok(ProjectsConfig { org: args.org, projects })
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(command) = cli.command else {
    bail!("Provide a subcommand: pull-requests | project-status | release-notes");
  };

  let report = match command {
    Command::PullRequests(a) => ReportConfig::PullRequests(PullRequestsConfig {
      owner: a.owner,
      repo: a.repo,
      include_issues: a.include_issues,
    }),
    Command::ProjectStatus(a) => ReportConfig::ProjectStatus(normalize_projects(a)?),
    Command::ReleaseNotes(a) => {
      let milestones: Vec<String> = if a.milestones.is_empty() {
        DEFAULT_MILESTONES.iter().map(|m| m.to_string()).collect()
      } else {
        a.milestones
          .iter()
          .map(|m| m.trim().to_string())
          .filter(|m| !m.is_empty())
          .collect()
      };

      if milestones.is_empty() {
        bail!("--milestone values are all empty; at least one milestone is required");
      }

      if a.notes_file.trim().is_empty() {
        bail!("--notes-file must not be empty");
      }

      ReportConfig::ReleaseNotes(ReleaseConfig {
        projects: normalize_projects(a.project)?,
        milestones,
        issues_owner: a.issues_owner,
        issues_repo: a.issues_repo,
        notes_file: a.notes_file,
      })
    }
  };

  Ok(EffectiveConfig {
    token_file: cli.token_file,
    out_dir: cli.out_dir,
    api_base: cli.api_base.trim_end_matches('/').to_string(),
    now_override: cli.now_override,
    report,
  })
}
