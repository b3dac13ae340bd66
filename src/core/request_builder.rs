use crate::core::{
    InvestmentCurve, ProjectionRequest, RawProjectionParams, RealEstateMortgageGrowth,
};
use crate::utils::error::{ProjectionError, Result};
use serde_json::Value;

pub const MISSING_PARAMETERS: &str = "Missing required parameters";

/// Turns user parameters into a request payload with rates as fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBuilder {
    baseline: RawProjectionParams,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(Self::baseline_params())
    }
}

impl RequestBuilder {
    pub fn new(baseline: RawProjectionParams) -> Self {
        Self { baseline }
    }

    /// Parameters used for the first page load.
    pub fn baseline_params() -> RawProjectionParams {
        RawProjectionParams::new(
            InvestmentCurve {
                initial_sum: 100000.0,
                investment_rate: 10.0,
                return_rate: 7.0,
            },
            RealEstateMortgageGrowth {
                initial_price: 500000.0,
                growth_rate: 3.0,
                down_payment_percentage: 20.0,
            },
        )
    }

    pub fn baseline(&self) -> &RawProjectionParams {
        &self.baseline
    }

    pub fn build_default(&self) -> Result<ProjectionRequest> {
        self.build(&self.baseline)
    }

    pub fn build(&self, raw: &RawProjectionParams) -> Result<ProjectionRequest> {
        let investment = raw.investment_input.as_ref();
        let mortgage = raw.mortgage_input.as_ref();

        let initial_sum = required(investment.and_then(|i| i.initial_sum.as_ref()))?;
        let investment_rate = required(investment.and_then(|i| i.investment_rate.as_ref()))?;
        let return_rate = required(investment.and_then(|i| i.return_rate.as_ref()))?;
        let initial_price = required(mortgage.and_then(|m| m.initial_price.as_ref()))?;
        let growth_rate = required(mortgage.and_then(|m| m.growth_rate.as_ref()))?;
        let down_payment = required(mortgage.and_then(|m| m.down_payment_percentage.as_ref()))?;

        let purchase_x = raw
            .purchase_x
            .as_ref()
            .and_then(coerce_number)
            .filter(|x| x.is_finite() && *x >= 0.0);

        Ok(ProjectionRequest {
            investment_input: InvestmentCurve {
                initial_sum,
                investment_rate: percent_to_fraction(investment_rate),
                return_rate: percent_to_fraction(return_rate),
            },
            mortgage_input: RealEstateMortgageGrowth {
                initial_price,
                growth_rate: percent_to_fraction(growth_rate),
                down_payment_percentage: percent_to_fraction(down_payment),
            },
            purchase_x,
        })
    }
}

fn percent_to_fraction(percent: f64) -> f64 {
    percent / 100.0
}

// Zero, NaN and infinities count as missing.
fn required(value: Option<&Value>) -> Result<f64> {
    value
        .and_then(coerce_number)
        .filter(|v| *v != 0.0 && v.is_finite())
        .ok_or_else(|| ProjectionError::validation(MISSING_PARAMETERS))
}

/// Lenient numeric conversion for form input.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
