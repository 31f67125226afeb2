// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the bearer token used for every GitHub request from a plain-text file
// role: input/credential
// inputs: Path to a token file
// outputs: Credential (opaque, redacted in Debug)
// invariants: Token is whitespace-trimmed and non-empty; never logged
// errors: Missing/unreadable file or empty token surface as anyhow errors with the path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Opaque bearer token. Read once at start, held in memory for the run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn token(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(<redacted>)")
  }
}

pub fn read_token_from_file(path: &Path) -> Result<Credential> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("reading token file {}", path.display()))?;
  let token = raw.trim();

  if token.is_empty() {
    bail!("token file {} is empty", path.display());
  }

  Ok(Credential::new(token))
}
