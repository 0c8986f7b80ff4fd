use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

// A single line of a portfolio: how many shares of which stock, bought at what price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub cost_price: f64,
}

impl Holding {
    pub fn cost(&self) -> f64 {
        self.quantity * self.cost_price
    }
}

/// Row shape of the `portfolios` table. Holdings are stored as a JSON array.
#[derive(Debug, Clone, FromRow)]
pub struct PortfolioRow {
    pub id: i64,
    pub name: String,
    pub stock_count: i64,
    pub stocks: String,
    pub created_at: String,
    pub initial_value: f64,
    pub current_value: Option<f64>,
    pub created_time: String,
    pub updated_time: String,
}

// Represents a named basket of holdings tracked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub stock_count: i64,
    pub holdings: Vec<Holding>,
    pub created_at: String,
    pub initial_value: f64,
    /// Attached on read from the latest closes; never trusted from storage.
    pub current_value: Option<f64>,
}

impl Portfolio {
    pub fn new(name: String, holdings: Vec<Holding>, created_at: String) -> Self {
        let mut portfolio = Self {
            id: 0,
            name,
            stock_count: 0,
            holdings: Vec::new(),
            created_at,
            initial_value: 0.0,
            current_value: None,
        };
        portfolio.set_holdings(holdings);
        portfolio
    }

    /// Replaces the holdings, keeping `stock_count` and `initial_value` in step.
    pub fn set_holdings(&mut self, holdings: Vec<Holding>) {
        self.stock_count = holdings.len() as i64;
        self.initial_value = initial_value_of(&holdings);
        self.holdings = holdings;
    }

    pub fn holdings_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.holdings)
    }

    pub fn profit_percent(&self) -> f64 {
        if self.initial_value == 0.0 {
            return 0.0;
        }
        let current = self.current_value.unwrap_or(self.initial_value);
        (current - self.initial_value) / self.initial_value * 100.0
    }
}

impl From<PortfolioRow> for Portfolio {
    fn from(row: PortfolioRow) -> Self {
        let holdings = serde_json::from_str::<Vec<Holding>>(&row.stocks).unwrap_or_else(|e| {
            warn!("Portfolio {} has undecodable holdings, treating as empty: {}", row.id, e);
            Vec::new()
        });
        Self {
            id: row.id,
            name: row.name,
            stock_count: holdings.len() as i64,
            holdings,
            created_at: row.created_at,
            initial_value: row.initial_value,
            current_value: None,
        }
    }
}

pub fn initial_value_of(holdings: &[Holding]) -> f64 {
    holdings.iter().map(Holding::cost).sum()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolio {
    pub name: String,
    #[serde(default)]
    pub stocks: Vec<Holding>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdatePortfolio {
    pub name: Option<String>,
    pub stocks: Option<Vec<Holding>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub id: i64,
    pub name: String,
    pub stock_count: i64,
    pub stocks: Vec<Holding>,
    pub created_at: String,
    pub initial_value: f64,
    pub current_value: f64,
    pub profit_percent: f64,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(p: Portfolio) -> Self {
        let profit_percent = p.profit_percent();
        Self {
            id: p.id,
            name: p.name,
            stock_count: p.stock_count,
            created_at: p.created_at,
            initial_value: p.initial_value,
            current_value: p.current_value.unwrap_or(p.initial_value),
            profit_percent,
            stocks: p.holdings,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
