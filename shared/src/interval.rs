//! Interval-code arithmetic shared by the store and the reconciler.

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Fixed millisecond duration of one bar for a Binance interval code.
///
/// `1M` is approximated as 30 fixed days. That is only used to size fetch
/// batches; the provider applies its own month-boundary semantics to the
/// requested window. Unknown codes fall back to one hour with a warning
/// rather than failing the run.
pub fn interval_millis(code: &str) -> i64 {
    match code {
        "1m" => MINUTE_MS,
        "3m" => 3 * MINUTE_MS,
        "5m" => 5 * MINUTE_MS,
        "15m" => 15 * MINUTE_MS,
        "30m" => 30 * MINUTE_MS,
        "1h" => HOUR_MS,
        "2h" => 2 * HOUR_MS,
        "4h" => 4 * HOUR_MS,
        "6h" => 6 * HOUR_MS,
        "8h" => 8 * HOUR_MS,
        "12h" => 12 * HOUR_MS,
        "1d" => DAY_MS,
        "3d" => 3 * DAY_MS,
        "1w" => 7 * DAY_MS,
        "1M" => 30 * DAY_MS,
        other => {
            tracing::warn!(
                "unknown interval '{}', assuming a 1-hour duration for batch sizing",
                other
            );
            HOUR_MS
        }
    }
}

/// Floor a millisecond timestamp down to the interval boundary.
pub fn truncate_to_interval(ts: i64, step: i64) -> i64 {
    ts - ts.rem_euclid(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_known_code() {
        let cases = [
            ("1m", 60_000),
            ("3m", 180_000),
            ("5m", 300_000),
            ("15m", 900_000),
            ("30m", 1_800_000),
            ("1h", 3_600_000),
            ("2h", 7_200_000),
            ("4h", 14_400_000),
            ("6h", 21_600_000),
            ("8h", 28_800_000),
            ("12h", 43_200_000),
            ("1d", 86_400_000),
            ("3d", 259_200_000),
            ("1w", 604_800_000),
            ("1M", 2_592_000_000),
        ];
        for (code, millis) in cases {
            assert_eq!(interval_millis(code), millis, "interval {}", code);
        }
    }

    #[test]
    fn unknown_code_defaults_to_one_hour() {
        assert_eq!(interval_millis("42x"), 3_600_000);
        assert_eq!(interval_millis(""), 3_600_000);
    }

    #[test]
    fn truncation_floors_to_the_boundary() {
        let step = 900_000; // 15m
        assert_eq!(truncate_to_interval(1_737_072_000_000, step), 1_737_072_000_000);
        assert_eq!(
            truncate_to_interval(1_737_072_000_000 + 899_999, step),
            1_737_072_000_000
        );
        assert_eq!(
            truncate_to_interval(1_737_072_000_000 + 900_000, step),
            1_737_072_000_000 + 900_000
        );
    }
}
