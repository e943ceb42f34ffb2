//! Command-line interface for inspecting MCP tool authorization
//!
//! Loads the same configuration a server would and answers questions about
//! it: which roles exist, what the current environment resolves to, and
//! whether a given role may use a given tool.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pulseengine_mcp_authz::{AuthzConfig, Authorizer, LogFormat, LoggingConfig, TracingObserver};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "mcp-authz-cli")]
#[command(about = "MCP Tool Authorization CLI - Inspect roles and tool permissions")]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, env = "MCP_AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (json, table)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log format on stderr (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered role
    Roles,

    /// Show the role the current environment resolves to
    Whoami,

    /// Check whether a role may use a tool
    Check {
        /// Tool name
        tool: String,

        /// Role to check (defaults to the resolved role)
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show allowed and documented-blocked tools for a role
    Tools {
        /// Role to inspect (defaults to the resolved role)
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show which role a credential maps to
    Resolve {
        /// Credential to resolve
        credential: String,
    },

    /// Report unknown tools and dangling role references in the policy
    Validate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput<'a> {
    role: &'a str,
    tool: &'a str,
    allowed: bool,
}

#[derive(Serialize)]
struct ToolsOutput<'a> {
    role: &'a str,
    allowed: Vec<String>,
    blocked: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let logging = LoggingConfig::new(if cli.verbose { "debug" } else { "warn" }, cli.log_format);
    if let Err(e) = logging.initialize() {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = run(cli) {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AuthzConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AuthzConfig::default(),
    };
    let authz = Authorizer::new(config);
    authz.add_observer(Arc::new(TracingObserver));
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Roles => {
            let roles = authz.all_role_summaries();
            if json {
                print_json(&roles)?;
            } else {
                println!("{:<12} {:<20} {:<8} {:>5}  DESCRIPTION", "KEY", "NAME", "ACCESS", "TOOLS");
                for role in roles {
                    println!(
                        "{:<12} {:<20} {:<8} {:>5}  {}",
                        role.key, role.name, role.access_level, role.tool_count, role.description
                    );
                }
            }
        }
        Commands::Whoami => {
            let summary = authz.agent_summary();
            let auth = authz.authenticate();
            if json {
                print_json(&serde_json::json!({ "agent": summary, "auth": auth }))?;
            } else {
                println!("Role:          {} ({})", summary.role, summary.name);
                println!("Description:   {}", summary.description);
                println!("Allowed tools: {}", summary.allowed_count);
                println!("Blocked tools: {}", summary.blocked_count);
                match (&auth.identity, &auth.error) {
                    (Some(identity), _) => println!("Identity:      {identity}"),
                    (None, Some(err)) => println!("Auth error:    {err}"),
                    (None, None) => {}
                }
            }
        }
        Commands::Check { tool, role } => {
            let role = role.unwrap_or_else(|| authz.resolve_role());
            let allowed = authz.is_allowed(Some(role.as_str()), &tool);
            if json {
                print_json(&CheckOutput {
                    role: &role,
                    tool: &tool,
                    allowed,
                })?;
            } else if allowed {
                println!("ALLOWED  {tool} for role '{role}'");
            } else {
                println!("DENIED   {tool} for role '{role}'");
            }
            if !allowed {
                process::exit(2);
            }
        }
        Commands::Tools { role } => {
            let role = role.unwrap_or_else(|| authz.resolve_role());
            let output = ToolsOutput {
                role: &role,
                allowed: authz.allowed_operations(Some(role.as_str())).into_iter().collect(),
                blocked: authz.blocked_operations(Some(role.as_str())).into_iter().collect(),
            };
            if json {
                print_json(&output)?;
            } else {
                println!("Role '{}': {} allowed", output.role, output.allowed.len());
                for tool in &output.allowed {
                    println!("  + {tool}");
                }
                if !output.blocked.is_empty() {
                    println!("Documented as blocked:");
                    for tool in &output.blocked {
                        println!("  - {tool}");
                    }
                }
            }
        }
        Commands::Resolve { credential } => {
            let role = authz.resolve_role_from_credential(&credential);
            if json {
                print_json(&serde_json::json!({ "role": role }))?;
            } else {
                println!("{role}");
            }
        }
        Commands::Validate => {
            let warnings: Vec<String> = authz.validate().iter().map(ToString::to_string).collect();
            if json {
                print_json(&warnings)?;
            } else if warnings.is_empty() {
                println!("Policy OK");
            } else {
                for warning in &warnings {
                    println!("warning: {warning}");
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
