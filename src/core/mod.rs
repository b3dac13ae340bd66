pub mod request_builder;
pub mod store;
pub mod transformer;
pub mod validator;

pub use crate::domain::model::{
    InvestmentCurve, NamedSeries, Phase, PlotMetadata, Point, ProjectionRequest, ProjectionState,
    RawInvestmentInput, RawMortgageInput, RawProjectionParams, RealEstateMortgageGrowth,
    SeriesKind,
};
pub use crate::domain::ports::{ConfigProvider, Transport};
pub use crate::utils::error::Result;
