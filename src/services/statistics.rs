use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyQuote, MedianValuationPoint, NetValuePoint, NetValueStats, PercentileReading};

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Share of `values` that are <= `current`, in percent with one decimal.
/// Non-finite values are ignored; `None` when nothing is left to compare against.
pub fn percentile_rank(values: &[f64], current: f64) -> Option<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        return None;
    }
    let at_or_below = valid.iter().filter(|&&v| v <= current).count();
    Some(round_one_decimal(at_or_below as f64 / valid.len() as f64 * 100.0))
}

/// Percentile of the last row's ratio against the positive ratios of the
/// whole series. A negative latest ratio sits below every positive one; a
/// missing or zero latest ratio has no percentile.
pub fn latest_percentile<F>(history: &[DailyQuote], ratio: F) -> PercentileReading
where
    F: Fn(&DailyQuote) -> Option<f64>,
{
    let current = history.last().and_then(&ratio);
    let positives: Vec<f64> = history
        .iter()
        .filter_map(&ratio)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();

    let percentile = match current {
        Some(c) if c.is_finite() && c != 0.0 && !positives.is_empty() => percentile_rank(&positives, c),
        _ => None,
    };

    PercentileReading { current, percentile }
}

/// Equal-weight net value: for each date the mean close over the codes with a
/// positive close that day, divided by the first date's mean.
pub fn equal_weight_net_value(series: &BTreeMap<String, Vec<DailyQuote>>) -> Vec<NetValuePoint> {
    let mut by_date: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for quotes in series.values() {
        for q in quotes {
            let entry = by_date.entry(q.date.as_str()).or_insert((0.0, 0));
            if let Some(close) = q.close.filter(|c| *c > 0.0) {
                entry.0 += close;
                entry.1 += 1;
            }
        }
    }

    let averages: Vec<(&str, f64)> = by_date
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect();

    let Some(&(_, base)) = averages.first() else {
        return Vec::new();
    };

    averages
        .into_iter()
        .map(|(date, avg)| NetValuePoint {
            date: date.to_string(),
            value: if base > 0.0 { avg / base } else { 1.0 },
        })
        .collect()
}

fn calendar_days(start: &str, end: &str) -> i64 {
    match (
        NaiveDate::parse_from_str(start, "%Y-%m-%d"),
        NaiveDate::parse_from_str(end, "%Y-%m-%d"),
    ) {
        (Ok(s), Ok(e)) => (e - s).num_days(),
        _ => 0,
    }
}

/// Total return, maximum drawdown and annualized return of a net value series,
/// all in percent. Needs at least two points.
pub fn net_value_stats(points: &[NetValuePoint]) -> Option<NetValueStats> {
    if points.len() < 2 {
        return None;
    }
    let first = &points[0];
    let last = &points[points.len() - 1];
    let (start, end) = (first.value, last.value);

    let total_return = if start != 0.0 { (end - start) / start * 100.0 } else { 0.0 };

    let mut peak = start;
    let mut max_drawdown: f64 = 0.0;
    for p in points {
        if p.value > peak {
            peak = p.value;
        }
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - p.value) / peak * 100.0);
        }
    }

    let days = calendar_days(&first.date, &last.date);
    let years = days as f64 / 365.0;
    let annualized_return = if years > 0.0 && start > 0.0 && end > 0.0 {
        ((end / start).powf(1.0 / years) - 1.0) * 100.0
    } else {
        0.0
    };

    Some(NetValueStats {
        total_return,
        max_drawdown,
        annualized_return,
        days,
    })
}

pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Per-date median PE and PB across codes, skipping non-positive ratios.
pub fn median_valuation_series(series: &BTreeMap<String, Vec<DailyQuote>>) -> Vec<MedianValuationPoint> {
    let mut by_date: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for quotes in series.values() {
        for q in quotes {
            let (pes, pbs) = by_date.entry(q.date.as_str()).or_default();
            if let Some(pe) = q.pe_ttm.filter(|v| v.is_finite() && *v > 0.0) {
                pes.push(pe);
            }
            if let Some(pb) = q.pb_mrq.filter(|v| v.is_finite() && *v > 0.0) {
                pbs.push(pb);
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, (mut pes, mut pbs))| MedianValuationPoint {
            date: date.to_string(),
            median_pe: median(&mut pes),
            median_pb: median(&mut pbs),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(code: &str, date: &str, close: Option<f64>, pe: Option<f64>, pb: Option<f64>) -> DailyQuote {
        let mut q = DailyQuote::new(code, date);
        q.close = close;
        q.pe_ttm = pe;
        q.pb_mrq = pb;
        q
    }

    fn point(date: &str, value: f64) -> NetValuePoint {
        NetValuePoint { date: date.to_string(), value }
    }

    #[test]
    fn test_percentile_rank_counts_ties() {
        let values = vec![10.0, 20.0, 20.0, 30.0];
        assert_eq!(percentile_rank(&values, 20.0), Some(75.0));
        assert_eq!(percentile_rank(&values, 5.0), Some(0.0));
        assert_eq!(percentile_rank(&values, 30.0), Some(100.0));
    }

    #[test]
    fn test_percentile_rank_rounds_to_one_decimal() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(percentile_rank(&values, 1.0), Some(33.3));
        assert_eq!(percentile_rank(&[], 1.0), None);
    }

    #[test]
    fn test_latest_percentile_ignores_non_positive() {
        let history = vec![
            bar("A", "2024-01-01", None, Some(-3.0), Some(1.0)),
            bar("A", "2024-01-02", None, Some(10.0), Some(2.0)),
            bar("A", "2024-01-03", None, Some(20.0), Some(3.0)),
            bar("A", "2024-01-04", None, Some(15.0), Some(4.0)),
        ];
        let pe = latest_percentile(&history, |q| q.pe_ttm);
        assert_eq!(pe.current, Some(15.0));
        assert_eq!(pe.percentile, Some(66.7));

        let pb = latest_percentile(&history, |q| q.pb_mrq);
        assert_eq!(pb.percentile, Some(100.0));
    }

    #[test]
    fn test_latest_percentile_zero_for_negative_latest() {
        let history = vec![
            bar("A", "2024-01-01", None, Some(8.0), None),
            bar("A", "2024-01-02", None, Some(-1.0), None),
        ];
        let pe = latest_percentile(&history, |q| q.pe_ttm);
        assert_eq!(pe.current, Some(-1.0));
        assert_eq!(pe.percentile, Some(0.0));
    }

    #[test]
    fn test_latest_percentile_none_for_missing_or_zero_latest() {
        let zero = vec![
            bar("A", "2024-01-01", None, Some(8.0), None),
            bar("A", "2024-01-02", None, Some(0.0), None),
        ];
        assert_eq!(latest_percentile(&zero, |q| q.pe_ttm).percentile, None);

        let missing = vec![
            bar("A", "2024-01-01", None, Some(8.0), None),
            bar("A", "2024-01-02", None, None, None),
        ];
        let pe = latest_percentile(&missing, |q| q.pe_ttm);
        assert_eq!(pe.current, None);
        assert_eq!(pe.percentile, None);
    }

    #[test]
    fn test_equal_weight_averages_available_codes() {
        let mut series = BTreeMap::new();
        series.insert(
            "A".to_string(),
            vec![
                bar("A", "2024-01-01", Some(10.0), None, None),
                bar("A", "2024-01-02", Some(12.0), None, None),
                bar("A", "2024-01-03", Some(11.0), None, None),
            ],
        );
        series.insert(
            "B".to_string(),
            vec![
                bar("B", "2024-01-01", Some(20.0), None, None),
                bar("B", "2024-01-03", Some(22.0), None, None),
            ],
        );

        let net = equal_weight_net_value(&series);
        assert_eq!(net.len(), 3);
        assert_eq!(net[0], point("2024-01-01", 1.0));
        // Only A trades on the 2nd: 12 / 15.
        assert!((net[1].value - 0.8).abs() < 1e-12);
        assert!((net[2].value - 16.5 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_weight_skips_days_without_prices() {
        let mut series = BTreeMap::new();
        series.insert(
            "A".to_string(),
            vec![
                bar("A", "2024-01-01", Some(0.0), None, None),
                bar("A", "2024-01-02", Some(5.0), None, None),
            ],
        );
        let net = equal_weight_net_value(&series);
        assert_eq!(net, vec![point("2024-01-02", 1.0)]);
        assert!(equal_weight_net_value(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_net_value_stats() {
        let points = vec![
            point("2023-01-01", 1.0),
            point("2023-06-01", 1.5),
            point("2023-09-01", 1.2),
            point("2024-01-01", 1.21),
        ];
        let stats = net_value_stats(&points).unwrap();
        assert!((stats.total_return - 21.0).abs() < 1e-9);
        assert!((stats.max_drawdown - 20.0).abs() < 1e-9);
        assert_eq!(stats.days, 365);
        assert!((stats.annualized_return - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_value_stats_two_year_span() {
        let points = vec![point("2022-01-01", 1.0), point("2024-01-01", 1.21)];
        let stats = net_value_stats(&points).unwrap();
        assert_eq!(stats.days, 730);
        assert!((stats.annualized_return - 10.0).abs() < 1e-9);
        assert_eq!(stats.max_drawdown, 0.0);
    }

    #[test]
    fn test_net_value_stats_needs_two_points() {
        assert!(net_value_stats(&[point("2024-01-01", 1.0)]).is_none());
        let same_day = net_value_stats(&[point("2024-01-01", 1.0), point("2024-01-01", 1.1)]).unwrap();
        assert_eq!(same_day.annualized_return, 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_median_valuation_skips_non_positive() {
        let mut series = BTreeMap::new();
        series.insert(
            "A".to_string(),
            vec![bar("A", "2024-01-01", None, Some(10.0), Some(-1.0))],
        );
        series.insert(
            "B".to_string(),
            vec![bar("B", "2024-01-01", None, Some(-4.0), Some(0.0))],
        );
        series.insert(
            "C".to_string(),
            vec![bar("C", "2024-01-01", None, Some(30.0), None)],
        );

        let medians = median_valuation_series(&series);
        assert_eq!(medians.len(), 1);
        assert_eq!(medians[0].median_pe, Some(20.0));
        assert_eq!(medians[0].median_pb, None);
    }
}
