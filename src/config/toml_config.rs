use crate::core::{InvestmentCurve, RawProjectionParams, RealEstateMortgageGrowth};
use crate::utils::error::{ProjectionError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: Option<ApiConfig>,
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Baseline parameters for the default fetch. Rates are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub initial_sum: f64,
    pub investment_rate: f64,
    pub return_rate: f64,
    pub initial_price: f64,
    pub growth_rate: f64,
    pub down_payment_percentage: f64,
    pub purchase_x: Option<f64>,
}

impl DefaultsConfig {
    pub fn to_params(&self) -> RawProjectionParams {
        let params = RawProjectionParams::new(
            InvestmentCurve {
                initial_sum: self.initial_sum,
                investment_rate: self.investment_rate,
                return_rate: self.return_rate,
            },
            RealEstateMortgageGrowth {
                initial_price: self.initial_price,
                growth_rate: self.growth_rate,
                down_payment_percentage: self.down_payment_percentage,
            },
        );
        match self.purchase_x {
            Some(x) => params.with_purchase_x(x),
            None => params,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProjectionError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProjectionError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PROJECTION_API_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProjectionError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(api) = &self.api {
            if let Some(base_url) = &api.base_url {
                validate_url("api.base_url", base_url)?;
            }
            if let Some(timeout) = api.timeout_seconds {
                validate_positive_number("api.timeout_seconds", timeout, 1)?;
            }
        }

        if let Some(defaults) = &self.defaults {
            for (field, value) in [
                ("defaults.investment_rate", defaults.investment_rate),
                ("defaults.return_rate", defaults.return_rate),
                ("defaults.growth_rate", defaults.growth_rate),
                ("defaults.down_payment_percentage", defaults.down_payment_percentage),
            ] {
                validate_range(field, value, 0.0, 100.0)?;
            }
        }

        Ok(())
    }
}
