use std::convert::TryInto;

use time::{Date, Month, PrimitiveDateTime, Time};

const MIN_YEAR: i32 = 1980;
const MAX_YEAR: i32 = 2107;

/// A timestamp as stored in a cabinet file record: a pair of MS-DOS date and
/// time words, with a resolution of two seconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DosDateTime {
    date: u16,
    time: u16,
}

impl DosDateTime {
    /// Wraps raw date and time words.  The words are kept as-is even if they
    /// do not describe a valid calendar date.
    pub fn from_bits(date: u16, time: u16) -> DosDateTime {
        DosDateTime { date, time }
    }

    /// Encodes a datetime, clamping it to the representable range (1980
    /// through 2107) and rounding odd seconds up.
    pub fn from_datetime(datetime: PrimitiveDateTime) -> DosDateTime {
        let datetime = if datetime.second() % 2 != 0 {
            datetime.saturating_add(time::Duration::seconds(1))
        } else {
            datetime
        };
        if datetime.year() < MIN_YEAR {
            return DosDateTime { date: 0x0021, time: 0 }; // 1980-01-01 00:00:00
        } else if datetime.year() > MAX_YEAR {
            return DosDateTime { date: 0xff9f, time: 0xbf7d }; // 2107-12-31 23:59:58
        }
        let year = (datetime.year() - MIN_YEAR) as u16;
        let month = datetime.month() as u16;
        let day = datetime.day() as u16;
        let hour = datetime.hour() as u16;
        let minute = datetime.minute() as u16;
        let second = datetime.second() as u16;
        DosDateTime {
            date: (year << 9) | (month << 5) | day,
            time: (hour << 11) | (minute << 5) | (second / 2),
        }
    }

    /// The current UTC time, encoded.
    pub fn now() -> DosDateTime {
        let now = time::OffsetDateTime::now_utc();
        DosDateTime::from_datetime(PrimitiveDateTime::new(
            now.date(),
            now.time(),
        ))
    }

    /// The raw date word.
    pub fn date_bits(&self) -> u16 {
        self.date
    }

    /// The raw time word.
    pub fn time_bits(&self) -> u16 {
        self.time
    }

    /// Decodes the words, or returns `None` if they do not form a valid
    /// date and time.
    pub fn to_datetime(&self) -> Option<PrimitiveDateTime> {
        let year = (self.date >> 9) as i32 + MIN_YEAR;
        let month: Month = (((self.date >> 5) & 0xf) as u8).try_into().ok()?;
        let day = (self.date & 0x1f) as u8;
        let date = Date::from_calendar_date(year, month, day).ok()?;

        let hour = (self.time >> 11) as u8;
        let minute = ((self.time >> 5) & 0x3f) as u8;
        let second = 2 * (self.time & 0x1f) as u8;
        let time = Time::from_hms(hour, minute, second).ok()?;

        Some(PrimitiveDateTime::new(date, time))
    }
}

impl From<PrimitiveDateTime> for DosDateTime {
    fn from(datetime: PrimitiveDateTime) -> DosDateTime {
        DosDateTime::from_datetime(datetime)
    }
}
