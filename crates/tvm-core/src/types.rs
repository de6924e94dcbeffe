use serde::{Deserialize, Serialize};

use crate::rate_conversion::{annuity_multiplier, period_rate};

/// Monetary amounts. Cash paid out is negative, cash received is positive.
pub type Money = f64;

/// Per-period rates expressed as decimals (0.005 = 0.5%).
pub type Rate = f64;

/// Nominal annual rates expressed as percentages (5.5 = 5.5% per year).
pub type Percent = f64;

/// The five time-value-of-money quantities. Exactly one is solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvmVariable {
    PresentValue,
    FutureValue,
    InterestRate,
    NumberOfPeriods,
    Payment,
}

impl TvmVariable {
    pub fn field_name(self) -> &'static str {
        match self {
            TvmVariable::PresentValue => "present_value",
            TvmVariable::FutureValue => "future_value",
            TvmVariable::InterestRate => "interest_rate",
            TvmVariable::NumberOfPeriods => "number_of_periods",
            TvmVariable::Payment => "payment",
        }
    }
}

/// When each payment falls within its period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Ordinary annuity.
    #[default]
    EndOfPeriod,
    /// Annuity due.
    BeginningOfPeriod,
}

impl PaymentTiming {
    pub fn from_end_of_period(is_end_of_period: bool) -> Self {
        if is_end_of_period {
            PaymentTiming::EndOfPeriod
        } else {
            PaymentTiming::BeginningOfPeriod
        }
    }
}

/// Whether the cash flows include a periodic payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowProfile {
    /// A level payment every period.
    Annuity,
    /// A single present amount growing to a single future amount.
    LumpSum,
}

/// 1-based inclusive range of payment periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: u32,
    pub end: u32,
}

impl PeriodRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of periods covered, both ends included.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl Default for PeriodRange {
    fn default() -> Self {
        Self { start: 1, end: 1 }
    }
}

/// A complete, validated parameter set. Before a solve the unknown's slot
/// holds zero; [`TvmParameters::with_resolved`] fills it in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TvmParameters {
    pub present_value: Money,
    pub future_value: Money,
    /// Nominal annual rate in percent.
    pub interest_rate: Percent,
    pub number_of_periods: f64,
    /// Zero for lump sums.
    pub payment: Money,
    pub payments_per_year: u32,
    pub compounding_periods_per_year: u32,
    pub timing: PaymentTiming,
}

impl TvmParameters {
    /// Effective rate per payment period.
    pub fn period_rate(&self) -> Rate {
        period_rate(
            self.interest_rate,
            self.payments_per_year,
            self.compounding_periods_per_year,
        )
    }

    pub fn annuity_multiplier(&self) -> f64 {
        annuity_multiplier(self.period_rate(), self.timing)
    }

    pub fn with_resolved(mut self, variable: TvmVariable, value: f64) -> Self {
        match variable {
            TvmVariable::PresentValue => self.present_value = value,
            TvmVariable::FutureValue => self.future_value = value,
            TvmVariable::InterestRate => self.interest_rate = value,
            TvmVariable::NumberOfPeriods => self.number_of_periods = value,
            TvmVariable::Payment => self.payment = value,
        }
        self
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64_cent_rounded".to_string(),
        },
    }
}
