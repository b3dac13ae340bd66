use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One backend series before sanitation. `points` is kept as raw JSON
/// because individual entries may be malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotMetadata {
    pub identifier: String,
    pub points: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentCurve {
    pub initial_sum: f64,
    pub investment_rate: f64,
    pub return_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateMortgageGrowth {
    pub initial_price: f64,
    pub growth_rate: f64,
    pub down_payment_percentage: f64,
}

/// Payload for `POST /data`. Rates are decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub investment_input: InvestmentCurve,
    pub mortgage_input: RealEstateMortgageGrowth,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub purchase_x: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInvestmentInput {
    #[serde(default)]
    pub initial_sum: Option<Value>,
    #[serde(default)]
    pub investment_rate: Option<Value>,
    #[serde(default)]
    pub return_rate: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMortgageInput {
    #[serde(default)]
    pub initial_price: Option<Value>,
    #[serde(default)]
    pub growth_rate: Option<Value>,
    #[serde(default)]
    pub down_payment_percentage: Option<Value>,
}

/// User-supplied parameters as they come from a form or the command line.
/// Percentages are on the 0-100 scale and every leaf may be missing or of
/// the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProjectionParams {
    #[serde(default)]
    pub investment_input: Option<RawInvestmentInput>,
    #[serde(default)]
    pub mortgage_input: Option<RawMortgageInput>,
    #[serde(default)]
    pub purchase_x: Option<Value>,
}

impl RawProjectionParams {
    pub fn new(investment: InvestmentCurve, mortgage: RealEstateMortgageGrowth) -> Self {
        Self {
            investment_input: Some(RawInvestmentInput {
                initial_sum: Some(Value::from(investment.initial_sum)),
                investment_rate: Some(Value::from(investment.investment_rate)),
                return_rate: Some(Value::from(investment.return_rate)),
            }),
            mortgage_input: Some(RawMortgageInput {
                initial_price: Some(Value::from(mortgage.initial_price)),
                growth_rate: Some(Value::from(mortgage.growth_rate)),
                down_payment_percentage: Some(Value::from(mortgage.down_payment_percentage)),
            }),
            purchase_x: None,
        }
    }

    pub fn with_purchase_x(mut self, purchase_x: f64) -> Self {
        self.purchase_x = Some(Value::from(purchase_x));
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: Vec<Point>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionState {
    pub series: Vec<NamedSeries>,
    pub data_loaded: bool,
    pub error: Option<String>,
    pub phase: Phase,
}

impl ProjectionState {
    pub fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            ..Self::default()
        }
    }

    pub fn loaded(series: Vec<NamedSeries>) -> Self {
        Self {
            series,
            data_loaded: true,
            error: None,
            phase: Phase::Loaded,
        }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            series: Vec::new(),
            data_loaded: false,
            error: Some(message.into()),
            phase: Phase::Errored,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.data_loaded && self.error.is_none()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
