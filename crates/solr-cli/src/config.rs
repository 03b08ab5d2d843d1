//! Command line configuration for `solr-translate`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOLR_HOST` | http://localhost:8983/solr | Engine base URL |
//! | `SOLR_CORE` | gettingstarted | Core name |
//! | `SOLR_ID_FIELD` | id | Unique key field |
//! | `SOLR_DEFAULT_LIMIT` | 10 | Page size when `$limit` is absent |
//! | `SOLR_MAX_LIMIT` | none | Cap applied to `$limit` |
//! | `SOLR_COMMIT_WITHIN` | 50s | Commit-within duration (`50s`, `1m`, `500ms`) |
//! | `SOLR_LOG_LEVEL` | warn | Log level |
//!
//! Values given on the command line or in the environment override those
//! read from `--config`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use helios_solr::AdapterConfig;

/// Prints the Solr-native document built from a generic request.
#[derive(Debug, Parser)]
#[command(name = "solr-translate")]
#[command(about = "Translate generic queries into Solr-native request documents")]
#[command(version)]
pub struct Cli {
    /// Adapter settings.
    #[command(flatten)]
    pub adapter: AdapterArgs,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SOLR_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// What to translate.
    #[command(subcommand)]
    pub command: Command,
}

/// Adapter configuration overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct AdapterArgs {
    /// JSON file holding a full adapter configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Engine base URL.
    #[arg(long, env = "SOLR_HOST", global = true)]
    pub host: Option<String>,

    /// Core name.
    #[arg(long, env = "SOLR_CORE", global = true)]
    pub core: Option<String>,

    /// Unique key field.
    #[arg(long, env = "SOLR_ID_FIELD", global = true)]
    pub id_field: Option<String>,

    /// Page size when `$limit` is absent.
    #[arg(long, env = "SOLR_DEFAULT_LIMIT", global = true)]
    pub default_limit: Option<usize>,

    /// Cap applied to `$limit`.
    #[arg(long, env = "SOLR_MAX_LIMIT", global = true)]
    pub max_limit: Option<usize>,

    /// Commit-within duration, e.g. `50s`.
    #[arg(long, env = "SOLR_COMMIT_WITHIN", global = true)]
    pub commit_within: Option<String>,
}

impl AdapterArgs {
    /// Builds and validates the adapter configuration.
    pub fn load(&self) -> anyhow::Result<AdapterConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<AdapterConfig>(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => AdapterConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(core) = &self.core {
            config.core = core.clone();
        }
        if let Some(id_field) = &self.id_field {
            config.id_field = id_field.clone();
        }
        if let Some(limit) = self.default_limit {
            config.paginate.default = limit;
        }
        if let Some(max) = self.max_limit {
            config.paginate.max = Some(max);
        }
        if let Some(within) = &self.commit_within {
            let duration = humantime::parse_duration(within)
                .with_context(|| format!("invalid commit-within duration '{within}'"))?;
            config.commit_strategy.commit_within = Some(duration);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Request kinds.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Translate a generic query into a JSON request API body.
    Query {
        /// Generic query as JSON; read from stdin when omitted.
        input: Option<String>,
    },
    /// Translate a `$suggest` query into a suggest request.
    Suggest {
        /// Generic query as JSON; read from stdin when omitted.
        input: Option<String>,
    },
    /// Translate an id, id list or filter into a delete request.
    Delete {
        /// Id, `*`, or a JSON list of ids.
        #[arg(long)]
        id: Option<String>,
        /// Filter as a JSON mapping.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Translate patch data into atomic-update documents.
    Patch {
        /// Target id, or a JSON list of ids; the shared update is printed when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Patch data as JSON; read from stdin when omitted.
        input: Option<String>,
    },
}
