use chrono::{DateTime, Duration, Utc};

/// Timestamp for the next write to a record last touched at `previous`.
///
/// Always strictly after `previous`, even when the wall clock has not
/// advanced (or went backwards) since the last write.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_timestamp_after_past() {
        let past = Utc::now() - Duration::hours(1);
        assert!(next_timestamp(past) > past);
    }

    #[test]
    fn test_next_timestamp_after_future() {
        let future = Utc::now() + Duration::hours(1);
        let next = next_timestamp(future);
        assert!(next > future);
        assert_eq!(next - future, Duration::microseconds(1));
    }
}
