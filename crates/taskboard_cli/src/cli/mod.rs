use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use taskboard_core::config::ConfigOverrides;
use taskboard_core::error::AppError;
use taskboard_core::view::StatusFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter used when TASKBOARD_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskboard add "Buy milk"
    Add { text: Option<String> },
    /// Toggle a task between active and completed
    ///
    /// Example: taskboard toggle 1734652800000
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: taskboard delete 1734652800000
    Delete { id: String },
    /// List tasks
    ///
    /// Example: taskboard list --filter active
    /// Example: taskboard list --search milk --page 2
    List {
        /// all, active or completed
        #[arg(long, value_parser = parse_status_filter)]
        filter: Option<StatusFilter>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<NonZeroUsize>,
    },
    /// Fetch and browse posts
    ///
    /// Example: taskboard posts --search qui --page 2
    Posts {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<NonZeroUsize>,
    },
    /// Show or change the color theme
    ///
    /// Example: taskboard theme toggle
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
    /// Show the next page of the last list (interactive mode)
    Next,
    /// Show the previous page of the last list (interactive mode)
    Prev,
    /// Fetch posts again after a failure
    Retry,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeCommand {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Use the light theme
    Light,
    /// Use the dark theme
    Dark,
}

fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    raw.parse().map_err(|err: AppError| err.message().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StoreDir,
    PostsUrl,
    PageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "store_dir" => ConfigOverrideTarget::StoreDir,
        "posts_url" => ConfigOverrideTarget::PostsUrl,
        "page_size" => ConfigOverrideTarget::PageSize,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Collects every `--config-override` flag into one set of overrides.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::StoreDir => {
                overrides.store_dir = Some(PathBuf::from(parsed.value));
            }
            ConfigOverrideTarget::PostsUrl => overrides.posts_url = Some(parsed.value),
            ConfigOverrideTarget::PageSize => {
                let size = parsed.value.parse().map_err(|_| {
                    AppError::invalid_input(format!("invalid page_size '{}'", parsed.value))
                })?;
                overrides.page_size = Some(size);
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
