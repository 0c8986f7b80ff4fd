pub mod bonus_queries;
pub mod portfolio_queries;
pub mod quote_queries;
