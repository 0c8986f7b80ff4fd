//! Composite PE/PB ranking for a single trading date.
//!
//! Each row gets an independent rank on PE and on PB among the rows whose
//! ratio is non-negative (cheapest = 1). Rows with a negative ratio share the
//! sentinel rank [`NEGATIVE_RANK`], which pushes loss-making or negative-book
//! stocks to the bottom without excluding them. Rows are then ordered by the
//! sum of both ranks and paginated.

use crate::models::{DailyQuote, Page};

/// Rank given to a row whose ratio is negative.
pub const NEGATIVE_RANK: u32 = 9999;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedQuote {
    pub quote: DailyQuote,
    pub pe_rank: u32,
    pub pb_rank: u32,
    pub total_rank: u32,
}

/// Missing ratios count as zero.
fn ratio(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Ranks (1-based) for every index whose value is non-negative, `None` for
/// the rest. Equal values keep their input order.
fn non_negative_ranks(values: &[f64]) -> (Vec<Option<u32>>, usize) {
    let mut eligible: Vec<usize> = (0..values.len()).filter(|&i| values[i] >= 0.0).collect();
    eligible.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![None; values.len()];
    for (position, &index) in eligible.iter().enumerate() {
        ranks[index] = Some(position as u32 + 1);
    }
    (ranks, eligible.len())
}

fn rank_for(value: f64, rank: Option<u32>, eligible: usize) -> u32 {
    if value >= 0.0 {
        rank.unwrap_or(eligible as u32 + 1)
    } else {
        NEGATIVE_RANK
    }
}

/// Attaches PE, PB and total ranks and returns the rows ordered by total rank.
/// The sort is stable, so rows with equal totals keep their input order.
pub fn rank(quotes: Vec<DailyQuote>) -> Vec<RankedQuote> {
    let pe: Vec<f64> = quotes.iter().map(|q| ratio(q.pe_ttm)).collect();
    let pb: Vec<f64> = quotes.iter().map(|q| ratio(q.pb_mrq)).collect();

    let (pe_ranks, pe_eligible) = non_negative_ranks(&pe);
    let (pb_ranks, pb_eligible) = non_negative_ranks(&pb);

    let mut ranked: Vec<RankedQuote> = quotes
        .into_iter()
        .enumerate()
        .map(|(i, quote)| {
            let pe_rank = rank_for(pe[i], pe_ranks[i], pe_eligible);
            let pb_rank = rank_for(pb[i], pb_ranks[i], pb_eligible);
            RankedQuote {
                quote,
                pe_rank,
                pb_rank,
                total_rank: pe_rank + pb_rank,
            }
        })
        .collect();

    ranked.sort_by_key(|r| r.total_rank);
    ranked
}

/// Ranks one date's rows and returns the requested page with the rank fields
/// stripped. `page` and `page_size` must be at least 1.
pub fn rank_page(quotes: Vec<DailyQuote>, page: usize, page_size: usize) -> Page<DailyQuote> {
    let ordered: Vec<DailyQuote> = rank(quotes).into_iter().map(|r| r.quote).collect();
    Page::slice(ordered, page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(code: &str, pe: Option<f64>, pb: Option<f64>) -> DailyQuote {
        let mut q = DailyQuote::new(code, "2024-03-01");
        q.pe_ttm = pe;
        q.pb_mrq = pb;
        q
    }

    fn codes(quotes: &[DailyQuote]) -> Vec<&str> {
        quotes.iter().map(|q| q.code.as_str()).collect()
    }

    #[test]
    fn test_three_row_example() {
        let rows = vec![
            quote("A", Some(5.0), Some(1.0)),
            quote("B", Some(-2.0), Some(0.5)),
            quote("C", Some(8.0), Some(2.0)),
        ];
        let ranked = rank(rows);

        let a = ranked.iter().find(|r| r.quote.code == "A").unwrap();
        let b = ranked.iter().find(|r| r.quote.code == "B").unwrap();
        let c = ranked.iter().find(|r| r.quote.code == "C").unwrap();
        assert_eq!((a.pe_rank, a.pb_rank, a.total_rank), (1, 2, 3));
        assert_eq!((b.pe_rank, b.pb_rank, b.total_rank), (9999, 1, 10000));
        assert_eq!((c.pe_rank, c.pb_rank, c.total_rank), (2, 3, 5));

        let order: Vec<&str> = ranked.iter().map(|r| r.quote.code.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_negative_pe_always_gets_sentinel() {
        let rows = vec![
            quote("X", Some(-0.01), Some(1.0)),
            quote("Y", Some(-5000.0), Some(1.0)),
            quote("Z", Some(12.0), Some(1.0)),
        ];
        for r in rank(rows) {
            if r.quote.pe_ttm.unwrap() < 0.0 {
                assert_eq!(r.pe_rank, NEGATIVE_RANK);
            }
        }
    }

    #[test]
    fn test_missing_ratios_rank_as_zero() {
        let rows = vec![
            quote("HAS", Some(3.0), Some(0.8)),
            quote("NONE", None, None),
        ];
        let ranked = rank(rows);
        assert_eq!(ranked[0].quote.code, "NONE");
        assert_eq!(ranked[0].pe_rank, 1);
        assert_eq!(ranked[0].pb_rank, 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![
            quote("first", Some(10.0), Some(1.0)),
            quote("second", Some(10.0), Some(1.0)),
            quote("third", Some(10.0), Some(1.0)),
        ];
        let ranked = rank(rows);
        let order: Vec<&str> = ranked.iter().map(|r| r.quote.code.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
        assert_eq!(ranked[0].pe_rank, 1);
        assert_eq!(ranked[2].pe_rank, 3);
    }

    #[test]
    fn test_pages_cover_every_row_once() {
        let rows: Vec<DailyQuote> = (0..23)
            .map(|i| {
                let pe = if i % 4 == 0 { -(i as f64) - 1.0 } else { (i * 7 % 13) as f64 };
                let pb = (i * 5 % 11) as f64 / 3.0;
                quote(&format!("C{:02}", i), Some(pe), Some(pb))
            })
            .collect();

        let full: Vec<DailyQuote> = rank(rows.clone()).into_iter().map(|r| r.quote).collect();

        let page_size = 5;
        let first = rank_page(rows.clone(), 1, page_size);
        assert_eq!(first.total, 23);
        assert_eq!(first.total_pages, 5);

        let mut merged = Vec::new();
        for page in 1..=first.total_pages {
            let p = rank_page(rows.clone(), page, page_size);
            if page == first.total_pages {
                assert_eq!(p.data.len(), p.total - (p.total_pages - 1) * page_size);
            } else {
                assert_eq!(p.data.len(), page_size);
            }
            merged.extend(p.data);
        }
        assert_eq!(codes(&merged), codes(&full));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let rows = vec![quote("A", Some(1.0), Some(1.0))];
        let page = rank_page(rows, 3, 20);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_empty_day() {
        let page = rank_page(Vec::new(), 1, 20);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }
}
