use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db;
use crate::errors::AppError;
use crate::models::{CreatePortfolio, Holding, Portfolio, PortfolioResponse, UpdatePortfolio};

/// Source of the most recent closing price for a stock code.
#[async_trait]
pub trait LatestClose: Send + Sync {
    async fn latest_close(&self, code: &str) -> Result<Option<f64>, AppError>;
}

#[async_trait]
impl LatestClose for SqlitePool {
    async fn latest_close(&self, code: &str) -> Result<Option<f64>, AppError> {
        db::quote_queries::fetch_latest_close(self, code)
            .await
            .map_err(|e| {
                error!("Failed to fetch latest close for {}: {}", code, e);
                AppError::Db(e)
            })
    }
}

/// Market value of the holdings at their latest closes. A holding without
/// market data is valued at its cost price.
pub async fn current_value(
    prices: &dyn LatestClose,
    portfolio: &Portfolio,
) -> Result<f64, AppError> {
    if portfolio.holdings.is_empty() {
        return Ok(portfolio.initial_value);
    }

    let mut total = 0.0;
    for holding in &portfolio.holdings {
        let price = prices
            .latest_close(&holding.code)
            .await?
            .unwrap_or(holding.cost_price);
        total += holding.quantity * price;
    }
    Ok(total)
}

async fn with_valuation(
    prices: &dyn LatestClose,
    mut portfolio: Portfolio,
) -> Result<PortfolioResponse, AppError> {
    portfolio.current_value = Some(current_value(prices, &portfolio).await?);
    Ok(portfolio.into())
}

fn validate_holdings(holdings: &[Holding]) -> Result<(), AppError> {
    for h in holdings {
        if h.code.trim().is_empty() {
            return Err(AppError::Validation("Holding code cannot be empty".into()));
        }
        if !h.quantity.is_finite() || h.quantity < 0.0 {
            return Err(AppError::Validation(format!(
                "Quantity for {} must be a non-negative number",
                h.code
            )));
        }
        if !h.cost_price.is_finite() || h.cost_price < 0.0 {
            return Err(AppError::Validation(format!(
                "Cost price for {} must be a non-negative number",
                h.code
            )));
        }
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Portfolio {} not found", id))
}

pub async fn create(
    pool: &SqlitePool,
    input: CreatePortfolio,
) -> Result<PortfolioResponse, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Portfolio name cannot be empty".into()));
    }
    validate_holdings(&input.stocks)?;

    let new_portfolio = Portfolio::new(input.name, input.stocks, input.created_at);
    let stocks_json = new_portfolio.holdings_json()?;
    let row = db::portfolio_queries::insert(pool, &new_portfolio, &stocks_json).await?;
    info!("Created portfolio {} with {} holdings", row.id, row.stock_count);
    with_valuation(pool, row.into()).await
}

/// Applies a partial update. Replacing the holdings re-derives the initial value;
/// otherwise the stored holdings text is written back untouched.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    input: UpdatePortfolio,
) -> Result<PortfolioResponse, AppError> {
    let row = db::portfolio_queries::fetch_one(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let (stored_stocks, stored_count) = (row.stocks.clone(), row.stock_count);
    let mut portfolio: Portfolio = row.into();

    if let Some(name) = input.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Portfolio name cannot be empty".into()));
        }
        portfolio.name = name;
    }
    let stocks_json = match input.stocks {
        Some(stocks) => {
            validate_holdings(&stocks)?;
            portfolio.set_holdings(stocks);
            portfolio.holdings_json()?
        }
        None => {
            portfolio.stock_count = stored_count;
            stored_stocks
        }
    };

    let row = db::portfolio_queries::update(pool, &portfolio, &stocks_json)
        .await?
        .ok_or_else(|| not_found(id))?;
    with_valuation(pool, row.into()).await
}

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<PortfolioResponse>, AppError> {
    let rows = db::portfolio_queries::fetch_all(pool).await?;
    let mut portfolios = Vec::with_capacity(rows.len());
    for row in rows {
        portfolios.push(with_valuation(pool, row.into()).await?);
    }
    Ok(portfolios)
}

pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<PortfolioResponse, AppError> {
    let portfolio: Portfolio = db::portfolio_queries::fetch_one(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?
        .into();
    with_valuation(pool, portfolio).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    match db::portfolio_queries::delete(pool, id).await {
        Ok(0) => Err(not_found(id)),
        Ok(_) => Ok(()),
        Err(e) => Err(AppError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedCloses(HashMap<String, f64>);

    #[async_trait]
    impl LatestClose for FixedCloses {
        async fn latest_close(&self, code: &str) -> Result<Option<f64>, AppError> {
            Ok(self.0.get(code).copied())
        }
    }

    fn holding(code: &str, quantity: f64, cost_price: f64) -> Holding {
        Holding {
            code: code.to_string(),
            name: String::new(),
            quantity,
            cost_price,
        }
    }

    fn closes(pairs: &[(&str, f64)]) -> FixedCloses {
        FixedCloses(pairs.iter().map(|(c, p)| (c.to_string(), *p)).collect())
    }

    #[tokio::test]
    async fn test_uses_latest_close() {
        let p = Portfolio::new(
            "Banks".into(),
            vec![holding("sh.600000", 100.0, 8.0), holding("sh.601398", 200.0, 5.0)],
            "2024-01-02".into(),
        );
        let value = current_value(&closes(&[("sh.600000", 10.0), ("sh.601398", 6.0)]), &p)
            .await
            .unwrap();
        assert!((value - 2200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_quote_falls_back_to_cost() {
        let mut p = Portfolio::new("X".into(), vec![holding("X", 10.0, 5.0)], "2024-01-02".into());
        let value = current_value(&closes(&[]), &p).await.unwrap();
        assert_eq!(value, 50.0);
        assert_eq!(value, p.initial_value);

        p.current_value = Some(value);
        assert_eq!(p.profit_percent(), 0.0);
    }

    #[tokio::test]
    async fn test_empty_holdings_value_is_initial_value() {
        let mut p = Portfolio::new("Empty".into(), vec![], "2024-01-02".into());
        p.initial_value = 123.0;
        let value = current_value(&closes(&[("A", 1.0)]), &p).await.unwrap();
        assert_eq!(value, 123.0);
    }

    #[test]
    fn test_validate_holdings_rejects_negative_quantity() {
        let err = validate_holdings(&[holding("A", -1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(validate_holdings(&[holding("A", 0.0, 0.0)]).is_ok());
    }
}
