//! Error types for cascade-rail with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Release-resolution failures carry their own
//! taxonomy (`ReleaseError`) and are wrapped here when they reach the CLI.

use crate::core::identity::Role;
use crate::release::outcome::ReleaseError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (I/O, host failures)
  System = 2,
  /// Validation failure (identities, manifests, lock invariants)
  Validation = 3,
  /// A cascade release ran and failed
  ReleaseFailed = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cascade-rail
#[derive(Debug)]
pub enum CascadeError {
  /// Configuration errors
  Config(ConfigError),

  /// Project/manifest lookup errors
  Project(ProjectError),

  /// Family lock invariant violations
  Lock(LockError),

  /// Release resolution failures
  Release(ReleaseError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl CascadeError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    CascadeError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    CascadeError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      CascadeError::Message { message, context, help } => CascadeError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      CascadeError::Config(_) => ExitCode::User,
      CascadeError::Project(_) => ExitCode::User,
      CascadeError::Lock(_) => ExitCode::Validation,
      CascadeError::Release(_) => ExitCode::ReleaseFailed,
      CascadeError::Io(_) => ExitCode::System,
      CascadeError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      CascadeError::Config(e) => e.help_message(),
      CascadeError::Project(e) => e.help_message(),
      CascadeError::Release(e) => e.help_message(),
      CascadeError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for CascadeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CascadeError::Config(e) => write!(f, "{}", e),
      CascadeError::Project(e) => write!(f, "{}", e),
      CascadeError::Lock(e) => write!(f, "{}", e),
      CascadeError::Release(e) => write!(f, "Release failed: {}", e),
      CascadeError::Io(e) => write!(f, "I/O error: {}", e),
      CascadeError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for CascadeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      CascadeError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for CascadeError {
  fn from(err: io::Error) -> Self {
    CascadeError::Io(err)
  }
}

impl From<String> for CascadeError {
  fn from(msg: String) -> Self {
    CascadeError::message(msg)
  }
}

impl From<&str> for CascadeError {
  fn from(msg: &str) -> Self {
    CascadeError::message(msg)
  }
}

impl From<ConfigError> for CascadeError {
  fn from(err: ConfigError) -> Self {
    CascadeError::Config(err)
  }
}

impl From<ProjectError> for CascadeError {
  fn from(err: ProjectError) -> Self {
    CascadeError::Project(err)
  }
}

impl From<LockError> for CascadeError {
  fn from(err: LockError) -> Self {
    CascadeError::Lock(err)
  }
}

impl From<ReleaseError> for CascadeError {
  fn from(err: ReleaseError) -> Self {
    CascadeError::Release(err)
  }
}

impl From<toml_edit::TomlError> for CascadeError {
  fn from(err: toml_edit::TomlError) -> Self {
    CascadeError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for CascadeError {
  fn from(err: toml_edit::de::Error) -> Self {
    CascadeError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for CascadeError {
  fn from(err: toml_edit::ser::Error) -> Self {
    CascadeError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for CascadeError {
  fn from(err: serde_json::Error) -> Self {
    CascadeError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// cascade.toml not found
  NotFound { family_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// cascade.toml already present where init would write one
  AlreadyExists { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Run `cascade init --name <family>` to create a configuration file.".to_string())
      }
      ConfigError::MissingField { field } => Some(format!("Add `{}` to cascade.toml.", field)),
      ConfigError::AlreadyExists { .. } => {
        Some("Remove the existing file or run commands against it directly.".to_string())
      }
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { family_root } => {
        write!(
          f,
          "No cascade configuration found.\nExpected file: {}/cascade.toml",
          family_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration already exists: {}", path.display())
      }
    }
  }
}

/// Project and manifest lookup errors
#[derive(Debug)]
pub enum ProjectError {
  /// No project with this handle in the family
  NotFound { project: String },

  /// No member project builds this module
  ModuleNotFound { module: String },

  /// Manifest is present but malformed
  InvalidManifest { path: PathBuf, reason: String },
}

impl ProjectError {
  fn help_message(&self) -> Option<String> {
    match self {
      ProjectError::NotFound { .. } | ProjectError::ModuleNotFound { .. } => {
        Some("List member projects with `cascade status`.".to_string())
      }
      ProjectError::InvalidManifest { .. } => None,
    }
  }
}

impl fmt::Display for ProjectError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProjectError::NotFound { project } => write!(f, "Project '{}' not found in family", project),
      ProjectError::ModuleNotFound { module } => write!(f, "No member project builds module '{}'", module),
      ProjectError::InvalidManifest { path, reason } => {
        write!(f, "Invalid manifest {}: {}", path.display(), reason)
      }
    }
  }
}

/// Family lock invariant violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
  /// A finish was observed for a role with no active builds
  Underflow { family: String, role: Role },
}

impl fmt::Display for LockError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LockError::Underflow { family, role } => {
        write!(f, "Family '{}' has no active {} build to finish", family, role)
      }
    }
  }
}

/// Result type alias for cascade-rail
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> CascadeResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> CascadeResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<CascadeError>,
{
  fn context(self, ctx: impl Into<String>) -> CascadeResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> CascadeResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &CascadeError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for CascadeError {
  fn from(err: anyhow::Error) -> Self {
    CascadeError::message(err.to_string())
  }
}
