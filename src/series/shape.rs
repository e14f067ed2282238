// src/series/shape.rs

use super::Series;

/// Cut every date to `YYYY-MM`. Order is preserved.
pub fn to_monthly(series: Series) -> Series {
    series
        .into_iter()
        .map(|mut p| {
            if let Some((idx, _)) = p.date.char_indices().nth(7) {
                p.date.truncate(idx);
            }
            p
        })
        .collect()
}

/// Keep the last `n` points.
pub fn take_last(mut series: Series, n: usize) -> Series {
    let skip = series.len().saturating_sub(n);
    series.drain(..skip);
    series
}

pub fn retain_valid(mut series: Series) -> Series {
    series.retain(|p| p.is_valid());
    series
}

/// Stable ascending sort on the date string.
pub fn sort_by_date(mut series: Series) -> Series {
    series.sort_by(|a, b| a.date.cmp(&b.date));
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesPoint;

    #[test]
    fn monthly_truncates_days_and_keeps_short_dates() {
        let series = vec![
            SeriesPoint::new("2024-01-15", 1.0),
            SeriesPoint::new("2024-02", 2.0),
            SeriesPoint::new("2024", 3.0),
        ];
        let dates: Vec<String> = to_monthly(series).into_iter().map(|p| p.date).collect();
        assert_eq!(dates, vec!["2024-01", "2024-02", "2024"]);
    }

    #[test]
    fn take_last_keeps_most_recent() {
        let series: Series = (1..=5)
            .map(|m| SeriesPoint::new(format!("2024-0{m}"), m as f64))
            .collect();
        let tail = take_last(series.clone(), 2);
        assert_eq!(tail, series[3..].to_vec());
        assert_eq!(take_last(series.clone(), 10), series);
    }

    #[test]
    fn retain_valid_drops_bad_points() {
        let series = vec![
            SeriesPoint::new("", 1.0),
            SeriesPoint::new("2020", f64::NAN),
            SeriesPoint::new("2021", 2.0),
        ];
        assert_eq!(retain_valid(series), vec![SeriesPoint::new("2021", 2.0)]);
    }

    #[test]
    fn sort_by_date_orders_strings() {
        let series = vec![SeriesPoint::new("2021-03", 1.0), SeriesPoint::new("2020-12", 2.0)];
        let sorted = sort_by_date(series);
        assert_eq!(sorted[0].date, "2020-12");
    }
}
