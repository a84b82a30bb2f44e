use chrono::{
  DateTime,
  Datelike,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

pub const TIMEZONE_ENV_VAR: &str =
  "PADDOCK_TIMEZONE";

const MINUTES_IN_DAY: f64 = 1440.0;
const MINUTES_IN_ALMOST_TWO_DAYS: f64 =
  2520.0;
const MINUTES_IN_MONTH: f64 = 43200.0;
const MINUTES_IN_TWO_MONTHS: f64 =
  86400.0;
const MINUTES_IN_YEAR: f64 = 525600.0;

/// Resolves the zone wall-clock task
/// fields are read in: the environment
/// wins over the configured value, UTC
/// is the fallback.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(
        &raw,
        TIMEZONE_ENV_VAR
      )
  {
    return tz;
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  chrono_tz::UTC
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured board timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

fn to_utc_from_local(
  local_naive: NaiveDateTime,
  tz: &Tz
) -> Option<DateTime<Utc>> {
  match tz
    .from_local_datetime(&local_naive)
  {
    | LocalResult::Single(local_dt) => {
      Some(local_dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::debug!(
        first = %first,
        second = %second,
        "ambiguous local datetime; using earliest"
      );
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Some(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => {
      tracing::debug!(
        local = %local_naive,
        "local datetime does not exist in timezone"
      );
      None
    }
  }
}

fn parse_wall_clock(
  date: &str,
  time: &str
) -> Option<NaiveDateTime> {
  let date = NaiveDate::parse_from_str(
    date.trim(),
    "%Y-%m-%d"
  )
  .ok()?;
  let time = time.trim();
  let time =
    NaiveTime::parse_from_str(
      time,
      "%H:%M:%S%.f"
    )
    .or_else(|_| {
      NaiveTime::parse_from_str(
        time, "%H:%M"
      )
    })
    .ok()?;
  Some(date.and_time(time))
}

/// Combines a task's start date and
/// start time into the instant it is
/// due. `None` when either part is
/// malformed or the wall-clock time
/// does not exist in `tz`.
#[must_use]
pub fn due_instant(
  date: &str,
  time: &str,
  tz: &Tz
) -> Option<DateTime<Utc>> {
  let local =
    parse_wall_clock(date, time)?;
  to_utc_from_local(local, tz)
}

/// Human-readable due label, e.g.
/// `March 10th, 2024 02:30 PM`. Falls
/// back to the literal values joined by
/// a space.
#[must_use]
pub fn format_due(
  date: &str,
  time: &str,
  tz: &Tz
) -> String {
  match parse_wall_clock(date, time) {
    | Some(local)
      if to_utc_from_local(local, tz)
        .is_some() =>
    {
      let day = local.day();
      format!(
        "{} {}{}, {} {}",
        local.format("%B"),
        day,
        ordinal_suffix(day),
        local.format("%Y"),
        local.format("%I:%M %p")
      )
    }
    | _ => format!("{date} {time}")
  }
}

fn ordinal_suffix(
  day: u32
) -> &'static str {
  if (11..=13).contains(&(day % 100)) {
    return "th";
  }
  match day % 10 {
    | 1 => "st",
    | 2 => "nd",
    | 3 => "rd",
    | _ => "th"
  }
}

/// Parses a creation timestamp. Offset
/// timestamps are absolute, bare
/// date-times are wall-clock in `tz`,
/// bare dates are UTC midnight.
pub fn parse_timestamp(
  raw: &str,
  tz: &Tz
) -> Option<DateTime<Utc>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(
      trimmed
    )
  {
    return Some(dt.with_timezone(&Utc));
  }

  for fmt in [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M"
  ] {
    if let Ok(naive) =
      NaiveDateTime::parse_from_str(
        trimmed, fmt
      )
    {
      return to_utc_from_local(
        naive, tz
      );
    }
  }

  NaiveDate::parse_from_str(
    trimmed,
    "%Y-%m-%d"
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
  .map(|naive| naive.and_utc())
}

/// Distance between `then` and `now` in
/// words with a direction suffix, e.g.
/// `3 days ago` or `in about 1 hour`.
#[must_use]
pub fn format_relative(
  then: DateTime<Utc>,
  now: DateTime<Utc>
) -> String {
  let delta = now - then;
  let seconds =
    delta.num_seconds().unsigned_abs()
      as f64;
  let distance =
    distance_in_words(seconds);

  if delta.num_seconds() >= 0 {
    format!("{distance} ago")
  } else {
    format!("in {distance}")
  }
}

fn distance_in_words(
  seconds: f64
) -> String {
  let minutes = (seconds / 60.0).round();

  if minutes < 1.0 {
    return "less than a minute"
      .to_string();
  }
  if minutes < 45.0 {
    return plural(
      minutes as u64,
      "minute"
    );
  }
  if minutes < 90.0 {
    return "about 1 hour".to_string();
  }
  if minutes < MINUTES_IN_DAY {
    let hours =
      (minutes / 60.0).round() as u64;
    return format!(
      "about {}",
      plural(hours, "hour")
    );
  }
  if minutes
    < MINUTES_IN_ALMOST_TWO_DAYS
  {
    return "1 day".to_string();
  }
  if minutes < MINUTES_IN_MONTH {
    let days = (minutes
      / MINUTES_IN_DAY)
      .round() as u64;
    return plural(days, "day");
  }
  if minutes < MINUTES_IN_TWO_MONTHS {
    let months = (minutes
      / MINUTES_IN_MONTH)
      .round() as u64;
    return format!(
      "about {}",
      plural(months, "month")
    );
  }

  if minutes < MINUTES_IN_YEAR {
    let months = (minutes
      / MINUTES_IN_MONTH)
      .round() as u64;
    return plural(months, "month");
  }

  let months = (minutes
    / MINUTES_IN_MONTH)
    .floor() as u64;

  let years = months / 12;
  let remainder = months % 12;
  if remainder < 3 {
    format!(
      "about {}",
      plural(years, "year")
    )
  } else if remainder < 9 {
    format!(
      "over {}",
      plural(years, "year")
    )
  } else {
    format!(
      "almost {}",
      plural(years + 1, "year")
    )
  }
}

fn plural(
  count: u64,
  unit: &str
) -> String {
  if count == 1 {
    format!("1 {unit}")
  } else {
    format!("{count} {unit}s")
  }
}

/// Relative label for a task's
/// `created_at`; unparsable values are
/// returned as-is.
#[must_use]
pub fn relative_created(
  raw: &str,
  now: DateTime<Utc>,
  tz: &Tz
) -> String {
  parse_timestamp(raw, tz)
    .map(|then| {
      format_relative(then, now)
    })
    .unwrap_or_else(|| raw.to_string())
}
