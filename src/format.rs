//! Display formatting for timestamps shown in pages and tables (UTC).

use time::{macros::format_description, OffsetDateTime};

pub fn datetime(t: OffsetDateTime) -> String {
    t.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// Wall-clock label used on the chart's x axis.
pub fn clock(t: OffsetDateTime) -> String {
    t.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

pub fn optional_datetime(t: Option<OffsetDateTime>) -> String {
    t.map(datetime).unwrap_or_else(|| "Never".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_utc_timestamps() {
        let t = datetime!(2024-03-09 07:05:01 UTC);
        assert_eq!(super::datetime(t), "2024-03-09 07:05:01");
        assert_eq!(clock(t), "07:05:01");
        assert_eq!(optional_datetime(None), "Never");
    }
}
