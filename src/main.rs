use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod credential;
mod derived;
mod ext;
mod flatten;
mod github;
mod report;
mod sheet;
mod util;
mod xlsx;

use crate::cli::{normalize, Cli};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let _ = fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  let now = util::effective_now(util::parse_now(cfg.now_override.as_deref())?);

  // Phase 2: credential + API seam
  let credential = credential::read_token_from_file(Path::new(&cfg.token_file))?;
  let api = github::api::build_api(credential);

  // Phase 3: run the selected report and point at what was written
  let out = report::run(&cfg, api.as_ref(), now)?;
  println!("{}", serde_json::to_string_pretty(&out)?);

  Ok(())
}
