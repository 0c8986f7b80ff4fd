pub mod analytics_service;
pub mod portfolio_service;
pub mod quote_service;
pub mod statistics;
pub mod valuation_ranking;
