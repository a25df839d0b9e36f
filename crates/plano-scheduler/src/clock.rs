//! Schedule evaluation in shifted local time.
//!
//! All jobs are defined against the configured UTC offset, so the hour a job
//! fires at is the same hour compared against stored reminder slots.

/// Local hours at which the daily reminder fires.
pub const DAILY_HOURS: [u32; 4] = [6, 12, 18, 21];

/// Local hour of the Sunday weekly digest.
const WEEKLY_HOUR: u32 = 9;

/// A wall-clock instant reduced to the fields the schedule cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStamp {
    /// Days since the Unix epoch, in local time.
    pub day: i64,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: u8,
    pub hour: u32,
    pub minute: u32,
}

impl LocalStamp {
    /// Shift a unix timestamp into the configured offset and split it.
    pub fn from_unix(ts: i64, tz_offset: i32) -> Self {
        let local = ts + (tz_offset as i64) * 3600;
        let day = local.div_euclid(86400);
        let secs = local.rem_euclid(86400);
        Self {
            day,
            // epoch day 0 was a Thursday
            weekday: ((day + 4).rem_euclid(7)) as u8,
            hour: (secs / 3600) as u32,
            minute: ((secs % 3600) / 60) as u32,
        }
    }

    /// Monotonic minute counter, used to fire each due job at most once.
    pub fn minute_key(&self) -> i64 {
        self.day * 1440 + (self.hour as i64) * 60 + self.minute as i64
    }
}

/// The three timed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    WeeklyDigest,
    /// Carries the local hour the reminder fired at.
    DailyReminder(u32),
    KeepAlive,
}

/// Which jobs fire at this local minute. Pure — the loop around it decides
/// when to evaluate.
pub fn due_jobs(stamp: &LocalStamp, keepalive_days: i64) -> Vec<Job> {
    let mut jobs = Vec::new();

    if stamp.minute != 0 {
        return jobs;
    }

    if stamp.weekday == 0 && stamp.hour == WEEKLY_HOUR {
        jobs.push(Job::WeeklyDigest);
    }

    if DAILY_HOURS.contains(&stamp.hour) {
        jobs.push(Job::DailyReminder(stamp.hour));
    }

    if stamp.hour == 0 && keepalive_days > 0 && stamp.day % keepalive_days == 0 {
        jobs.push(Job::KeepAlive);
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(day: i64, hour: u32, minute: u32) -> LocalStamp {
        LocalStamp {
            day,
            weekday: ((day + 4).rem_euclid(7)) as u8,
            hour,
            minute,
        }
    }

    #[test]
    fn epoch_is_thursday_and_shifts_by_offset() {
        let s = LocalStamp::from_unix(0, 7);
        assert_eq!(s.day, 0);
        assert_eq!(s.weekday, 4);
        assert_eq!(s.hour, 7);
        assert_eq!(s.minute, 0);
    }

    #[test]
    fn offset_can_roll_into_the_next_day() {
        // 22:00 UTC on day 0 is 05:00 on day 1 at UTC+7
        let s = LocalStamp::from_unix(22 * 3600, 7);
        assert_eq!(s.day, 1);
        assert_eq!(s.hour, 5);
    }

    #[test]
    fn first_sunday_after_epoch() {
        // 1970-01-04 was a Sunday
        let s = LocalStamp::from_unix(3 * 86400, 0);
        assert_eq!(s.weekday, 0);
    }

    #[test]
    fn weekly_fires_sunday_nine_local() {
        // day 3 = Sunday
        let jobs = due_jobs(&stamp(3, 9, 0), 5);
        assert!(jobs.contains(&Job::WeeklyDigest));
    }

    #[test]
    fn weekly_does_not_fire_off_sunday_or_off_hour() {
        assert!(!due_jobs(&stamp(4, 9, 0), 5).contains(&Job::WeeklyDigest));
        assert!(!due_jobs(&stamp(3, 10, 0), 5).contains(&Job::WeeklyDigest));
    }

    #[test]
    fn daily_fires_at_each_slot_hour() {
        for hour in DAILY_HOURS {
            let jobs = due_jobs(&stamp(1, hour, 0), 5);
            assert_eq!(jobs, vec![Job::DailyReminder(hour)]);
        }
    }

    #[test]
    fn nothing_fires_off_the_minute_boundary() {
        assert!(due_jobs(&stamp(3, 9, 30), 5).is_empty());
        assert!(due_jobs(&stamp(1, 6, 1), 5).is_empty());
    }

    #[test]
    fn keepalive_fires_every_fifth_midnight() {
        assert_eq!(due_jobs(&stamp(10, 0, 0), 5), vec![Job::KeepAlive]);
        assert!(due_jobs(&stamp(11, 0, 0), 5).is_empty());
        assert!(due_jobs(&stamp(10, 1, 0), 5).is_empty());
    }

    #[test]
    fn minute_keys_are_strictly_increasing() {
        let a = LocalStamp::from_unix(1000 * 60, 0).minute_key();
        let b = LocalStamp::from_unix(1001 * 60, 0).minute_key();
        assert_eq!(b, a + 1);
    }
}
