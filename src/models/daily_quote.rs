use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// One trading day of OHLCV and valuation data for a single stock.
// Field names on the wire match the stored column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyQuote {
    pub code: String,
    pub date: String,
    #[serde(rename = "codeName")]
    #[sqlx(rename = "codeName")]
    pub code_name: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub preclose: Option<f64>,
    pub volume: Option<i64>,
    pub amount: Option<f64>,
    pub adjustflag: Option<i64>,
    pub turn: Option<f64>,
    pub tradestatus: Option<i64>,
    #[serde(rename = "pctChg")]
    #[sqlx(rename = "pctChg")]
    pub pct_chg: Option<f64>,
    #[serde(rename = "peTTM")]
    #[sqlx(rename = "peTTM")]
    pub pe_ttm: Option<f64>,
    #[serde(rename = "pbMRQ")]
    #[sqlx(rename = "pbMRQ")]
    pub pb_mrq: Option<f64>,
    #[serde(rename = "psTTM")]
    #[sqlx(rename = "psTTM")]
    pub ps_ttm: Option<f64>,
    #[serde(rename = "pcfNcfTTM")]
    #[sqlx(rename = "pcfNcfTTM")]
    pub pcf_ncf_ttm: Option<f64>,
    #[serde(rename = "isST")]
    #[sqlx(rename = "isST")]
    pub is_st: Option<i64>,
}

impl DailyQuote {
    /// Bare row carrying only the identifying key; everything else empty.
    pub fn new(code: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            date: date.into(),
            code_name: None,
            open: None,
            high: None,
            low: None,
            close: None,
            preclose: None,
            volume: None,
            amount: None,
            adjustflag: None,
            turn: None,
            tradestatus: None,
            pct_chg: None,
            pe_ttm: None,
            pb_mrq: None,
            ps_ttm: None,
            pcf_ncf_ttm: None,
            is_st: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockCode {
    pub code: String,
    #[serde(rename = "codeName")]
    #[sqlx(rename = "codeName")]
    pub code_name: String,
}
