mod analytics;
mod bonus_record;
mod daily_quote;
mod pagination;
mod portfolio;

pub use analytics::*;
pub use bonus_record::BonusRecord;
pub use daily_quote::{DailyQuote, StockCode};
pub use pagination::{parse_param, Page, PageQuery};
pub use portfolio::{
    initial_value_of, CreatePortfolio, DeleteResponse, Holding, Portfolio, PortfolioResponse,
    PortfolioRow, UpdatePortfolio,
};
