//! Points in time as they appear in certificates and signed attributes.

use std::{fmt, io, ops, str};
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{Mode, Tag};
use bcder::decode::{ContentError, DecodeError, Source};
use bcder::encode::PrimitiveContent;
use chrono::{
    DateTime, Datelike, LocalResult, TimeZone, Timelike, Utc
};


//------------ Time ----------------------------------------------------------

/// A point in time with second precision.
///
/// ASN.1 knows two representations, `UTCTime` with a two digit year and
/// `GeneralizedTime`. [RFC 5652] requires the signing time attribute to use
/// the former for dates between 1950 and 2049 and the latter otherwise.
/// This is what [`encode_varied`][Self::encode_varied] does.
///
/// [RFC 5652]: https://tools.ietf.org/html/rfc5652
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    /// Returns the current time truncated to whole seconds.
    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now.with_nanosecond(0).unwrap_or(now))
    }

    /// Creates a time value from its components.
    ///
    /// Returns `None` if the components don’t describe a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
            LocalResult::Single(dt) => Some(Time(dt)),
            _ => None
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            match tag {
                Tag::UTC_TIME => {
                    // RFC 5280 requires the format YYMMDDHHMMSSZ
                    let year = read_two_char(prim)? as i32;
                    let year = if year >= 50 { year + 1900 }
                               else { year + 2000 };
                    let res = (
                        year,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                    );
                    if prim.take_u8()? != b'Z' {
                        return Err(prim.content_err(
                            "malformed time value"
                        ))
                    }
                    Self::from_parts(res).map_err(|err| prim.content_err(err))
                }
                Tag::GENERALIZED_TIME => {
                    // RFC 5280 requires the format YYYYMMDDHHMMSSZ
                    let res = (
                        read_four_char(prim)? as i32,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                    );
                    if prim.take_u8()? != b'Z' {
                        return Err(prim.content_err(
                            "malformed time value"
                        ))
                    }
                    Self::from_parts(res).map_err(|err| prim.content_err(err))
                }
                _ => {
                    Err(prim.content_err(
                        "malformed time value"
                    ))
                }
            }
        })
    }

    fn from_parts(
        parts: (i32, u32, u32, u32, u32, u32)
    ) -> Result<Self, ContentError> {
        Self::utc(
            parts.0, parts.1, parts.2, parts.3, parts.4, parts.5
        ).ok_or_else(|| ContentError::from_static("malformed time value"))
    }

    pub fn encode_utc_time(self) -> impl encode::Values {
        UtcTime(self).encode()
    }

    pub fn encode_generalized_time(self) -> impl encode::Values {
        GeneralizedTime(self).encode()
    }

    /// Returns an encoder choosing the representation by year.
    pub fn encode_varied(self) -> impl encode::Values {
        if self.year() < 1950 || self.year() > 2049 {
            (None, Some(self.encode_generalized_time()))
        }
        else {
            (Some(self.encode_utc_time()), None)
        }
    }
}


//--- Deref and AsRef

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}


//--- From

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}


fn read_two_char<S: decode::Source>(
    source: &mut S
) -> Result<u32, DecodeError<S::Error>> {
    let mut s = [0u8; 2];
    s[0] = source.take_u8()?;
    s[1] = source.take_u8()?;
    let s = match str::from_utf8(&s[..]) {
        Ok(s) => s,
        Err(_err) => {
            return Err(source.content_err("malformed time value"))
        }
    };
    u32::from_str(s).map_err(|_err| {
        source.content_err("malformed time value")
    })
}


fn read_four_char<S: decode::Source>(
    source: &mut S
) -> Result<u32, DecodeError<S::Error>> {
    let mut s = [0u8; 4];
    s[0] = source.take_u8()?;
    s[1] = source.take_u8()?;
    s[2] = source.take_u8()?;
    s[3] = source.take_u8()?;
    let s = match str::from_utf8(&s[..]) {
        Ok(s) => s,
        Err(_err) => {
            return Err(source.content_err("malformed time value"))
        }
    };
    u32::from_str(s).map_err(|_err| {
        source.content_err("malformed time value")
    })
}


//------------ UtcTime -------------------------------------------------------

struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ GeneralizedTime -----------------------------------------------

struct GeneralizedTime(Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::encode::Values;
    use super::*;

    #[test]
    fn encode_varied_picks_representation() {
        let time = Time::utc(2024, 3, 9, 17, 5, 1).unwrap();
        let utc = time.encode_varied().to_captured(Mode::Der);
        assert_eq!(utc.as_slice(), b"\x17\x0d240309170501Z");

        let time = Time::utc(2050, 1, 1, 0, 0, 0).unwrap();
        let gen = time.encode_varied().to_captured(Mode::Der);
        assert_eq!(gen.as_slice(), b"\x18\x0f20500101000000Z");
    }

    #[test]
    fn decode_both_representations() {
        let time = Mode::Der.decode(
            b"\x17\x0d990102030405Z".as_ref(), Time::take_from
        ).unwrap();
        assert_eq!(time, Time::utc(1999, 1, 2, 3, 4, 5).unwrap());

        let time = Mode::Der.decode(
            b"\x18\x0f20510102030405Z".as_ref(), Time::take_from
        ).unwrap();
        assert_eq!(time, Time::utc(2051, 1, 2, 3, 4, 5).unwrap());

        assert!(Mode::Der.decode(
            b"\x17\x0d991302030405Z".as_ref(), Time::take_from
        ).is_err());
    }

    #[test]
    fn now_has_whole_seconds() {
        assert_eq!(Time::now().nanosecond(), 0);
    }
}
