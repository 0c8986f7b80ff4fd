pub mod analytics;
pub mod health;
pub mod portfolios;
pub mod stocks;
