// OHLCV aggregation over a tick buffer. Nothing is cached: every call
// recomputes from the ticks it is given.
use shared::models::{Candle, Tick};
use shared::utils::{bucket_start, bucket_width_ms, tz_offset_ms};

/// Buckets `ticks` (ascending by time) into candles of `timeframe_seconds`.
///
/// Buckets run from the one holding the oldest tick up to the one holding
/// `now`. Buckets without ticks are skipped rather than filled, so gaps in
/// the tick stream show up as gaps in the output. Ticks past the bucket of
/// `now` are ignored.
pub fn build_candles<'a, I>(ticks: I, now: i64, timeframe_seconds: u32, tz_offset_hours: f64) -> Vec<Candle>
where
    I: IntoIterator<Item = &'a Tick>,
{
    let width = bucket_width_ms(timeframe_seconds);
    let shift = tz_offset_ms(tz_offset_hours);
    let last_bucket = bucket_start(now, width, shift);

    let mut candles = Vec::new();
    let mut forming: Option<Candle> = None;

    for tick in ticks {
        let bucket = bucket_start(tick.time_ms, width, shift);
        if bucket > last_bucket {
            break;
        }
        match forming.as_mut() {
            Some(candle) if candle.bucket_start == bucket => {
                candle.high = candle.high.max(tick.price);
                candle.low = candle.low.min(tick.price);
                candle.close = tick.price;
                candle.volume += 1;
            }
            _ => {
                if let Some(done) = forming.take() {
                    candles.push(done);
                }
                forming = Some(Candle {
                    bucket_start: bucket,
                    open: tick.price,
                    high: tick.price,
                    low: tick.price,
                    close: tick.price,
                    volume: 1,
                });
            }
        }
    }
    if let Some(done) = forming {
        candles.push(done);
    }
    candles
}

/// Lowest low and highest high, leaving out the `exclude_recent` newest candles.
/// Falls back to every candle when excluding would leave nothing to scan.
pub fn price_range(candles: &[Candle], exclude_recent: usize) -> Option<(f64, f64)> {
    let scan = if candles.len() > exclude_recent {
        &candles[..candles.len() - exclude_recent]
    } else {
        candles
    };
    scan.iter().fold(None, |acc, c| match acc {
        None => Some((c.low, c.high)),
        Some((lo, hi)) => Some((f64::min(lo, c.low), f64::max(hi, c.high))),
    })
}

/// Close of the bucket containing `time_ms`, or `None` when that bucket holds no ticks.
pub fn close_price_at<'a, I>(ticks: I, time_ms: i64, timeframe_seconds: u32, tz_offset_hours: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a Tick>,
{
    let width = bucket_width_ms(timeframe_seconds);
    let start = bucket_start(time_ms, width, tz_offset_ms(tz_offset_hours));
    let end = start + width;
    ticks
        .into_iter()
        .skip_while(|t| t.time_ms < start)
        .take_while(|t| t.time_ms < end)
        .last()
        .map(|t| t.price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(time_ms: i64, price: f64) -> Tick {
        Tick { time_ms, price }
    }

    #[test]
    fn gap_produces_no_synthetic_candle() {
        let mut ticks = Vec::new();
        for t in (0..60_000).step_by(1_000) {
            ticks.push(tick(t, 100.0 + t as f64 / 60_000.0));
        }
        ticks.push(tick(59_999, 100.5));
        for t in (120_000..180_000).step_by(1_000) {
            ticks.push(tick(t, 101.0));
        }
        ticks.push(tick(179_999, 101.2));

        let candles = build_candles(&ticks, 179_999, 60, 0.0);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].bucket_start, 0);
        assert_eq!(candles[1].bucket_start, 120_000);
        assert_eq!(candles[0].volume, 61);
        assert_eq!(candles[0].close, 100.5);
        assert_eq!(candles[1].close, 101.2);
    }

    #[test]
    fn ohlc_follows_tick_order() {
        let ticks = vec![tick(0, 10.0), tick(100, 12.0), tick(200, 9.0), tick(300, 11.0)];
        let candles = build_candles(&ticks, 300, 1, 0.0);
        assert_eq!(candles.len(), 1);
        let c = candles[0];
        assert_eq!((c.open, c.high, c.low, c.close, c.volume), (10.0, 12.0, 9.0, 11.0, 4));
    }

    #[test]
    fn single_tick_bucket_is_flat() {
        let candles = build_candles(&[tick(5_000, 3.5)], 5_000, 5, 0.0);
        let c = candles[0];
        assert_eq!(c.open, c.high);
        assert_eq!(c.low, c.close);
        assert_eq!(c.open, c.close);
        assert_eq!(c.volume, 1);
    }

    #[test]
    fn ticks_after_current_bucket_are_ignored() {
        let ticks = vec![tick(0, 1.0), tick(30_000, 2.0), tick(61_000, 3.0)];
        let candles = build_candles(&ticks, 45_000, 60, 0.0);
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 2.0);
    }

    #[test]
    fn timezone_shift_moves_bucket_edges() {
        // 30 minutes apart, same UTC hour, different UTC+5:30 hours
        let ticks = vec![tick(0, 1.0), tick(1_900_000, 2.0)];
        let utc = build_candles(&ticks, 1_900_000, 3600, 0.0);
        let ist = build_candles(&ticks, 1_900_000, 3600, 5.5);
        assert_eq!(utc.len(), 1);
        assert_eq!(ist.len(), 2);
        assert_eq!(ist[1].bucket_start, 1_800_000);
    }

    #[test]
    fn zero_timeframe_behaves_like_one_second() {
        let ticks = vec![tick(0, 1.0), tick(999, 2.0), tick(1_000, 3.0)];
        assert_eq!(build_candles(&ticks, 1_000, 0, 0.0), build_candles(&ticks, 1_000, 1, 0.0));
    }

    #[test]
    fn empty_buffer_yields_no_candles() {
        assert!(build_candles(&[], 1_000, 60, 0.0).is_empty());
        assert_eq!(price_range(&[], 3), None);
    }

    #[test]
    fn price_range_skips_recent_candles() {
        let ticks: Vec<Tick> = (0..5).map(|i| tick(i * 1_000, 10.0 + i as f64)).collect();
        let candles = build_candles(&ticks, 4_000, 1, 0.0);
        assert_eq!(price_range(&candles, 0), Some((10.0, 14.0)));
        assert_eq!(price_range(&candles, 3), Some((10.0, 11.0)));
        // not enough candles left: scan them all
        assert_eq!(price_range(&candles, 10), Some((10.0, 14.0)));
    }

    #[test]
    fn close_price_lookup() {
        let ticks = vec![tick(0, 1.0), tick(500, 1.5), tick(2_000, 2.0)];
        assert_eq!(close_price_at(&ticks, 250, 1, 0.0), Some(1.5));
        assert_eq!(close_price_at(&ticks, 1_500, 1, 0.0), None);
        assert_eq!(close_price_at(&ticks, 2_999, 1, 0.0), Some(2.0));
    }
}
