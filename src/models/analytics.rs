use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetValuePoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetValueStats {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub annualized_return: f64,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqualWeightResponse {
    pub series: Vec<NetValuePoint>,
    pub stats: Option<NetValueStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedianValuationPoint {
    pub date: String,
    pub median_pe: Option<f64>,
    pub median_pb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileReading {
    pub current: Option<f64>,
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationPercentiles {
    pub code: String,
    pub points: usize,
    pub pe: PercentileReading,
    pub pb: PercentileReading,
}

/// Body shared by the multi-code range endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CodesRangeRequest {
    pub codes: Vec<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodesDateRequest {
    pub codes: Vec<String>,
    pub date: String,
}
