use crate::config::toml_config::TomlConfig;
use crate::config::ClientSettings;
use crate::core::{RawInvestmentInput, RawMortgageInput, RawProjectionParams};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "projection-client")]
#[command(about = "Fetch an investment vs. real-estate projection as chart-ready series")]
pub struct CliConfig {
    #[arg(long, help = "Base URL of the projection service")]
    pub api_url: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Projection for the baseline parameters
    Default,
    /// Projection for the given parameters (rates in percent)
    Project(ProjectArgs),
    /// Single unnamed series from `GET /data`
    Legacy,
}

/// Values are kept as text and coerced by the request builder.
#[derive(Debug, Clone, Default, Args)]
pub struct ProjectArgs {
    #[arg(long)]
    pub initial_sum: Option<String>,
    #[arg(long)]
    pub investment_rate: Option<String>,
    #[arg(long)]
    pub return_rate: Option<String>,
    #[arg(long)]
    pub initial_price: Option<String>,
    #[arg(long)]
    pub growth_rate: Option<String>,
    #[arg(long)]
    pub down_payment: Option<String>,
    #[arg(long)]
    pub purchase_x: Option<String>,
}

impl ProjectArgs {
    pub fn to_params(&self) -> RawProjectionParams {
        let text = |v: &Option<String>| v.clone().map(Value::String);
        RawProjectionParams {
            investment_input: Some(RawInvestmentInput {
                initial_sum: text(&self.initial_sum),
                investment_rate: text(&self.investment_rate),
                return_rate: text(&self.return_rate),
            }),
            mortgage_input: Some(RawMortgageInput {
                initial_price: text(&self.initial_price),
                growth_rate: text(&self.growth_rate),
                down_payment_percentage: text(&self.down_payment),
            }),
            purchase_x: text(&self.purchase_x),
        }
    }
}

impl CliConfig {
    pub fn settings(&self) -> Result<ClientSettings> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate_config()?;
                Some(file)
            }
            None => None,
        };

        let settings =
            ClientSettings::resolve(self.api_url.as_deref(), self.timeout_seconds, file.as_ref());
        settings.validate()?;
        Ok(settings)
    }
}
