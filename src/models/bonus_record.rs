use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Dividend or split event for a stock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BonusRecord {
    pub code: String,
    #[serde(rename = "dateStr")]
    #[sqlx(rename = "dateStr")]
    pub date_str: String,
    #[serde(rename = "codeName")]
    #[sqlx(rename = "codeName")]
    pub code_name: Option<String>,
    #[serde(rename = "bonusData")]
    #[sqlx(rename = "bonusData")]
    pub bonus_data: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "stockDividend")]
    #[sqlx(rename = "stockDividend")]
    pub stock_dividend: Option<f64>,
}
