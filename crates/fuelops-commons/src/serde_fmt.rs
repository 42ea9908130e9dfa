//! Wire formats for calendar dates and wall-clock times.
//!
//! Instants use `time::serde::rfc3339`; these modules cover the two formats
//! RFC 3339 does not: `YYYY-MM-DD` dates and `HH:MM:SS` times.

pub mod hms {
    use serde::de::Error as _;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use time::macros::format_description;
    use time::Time;

    const FORMAT: &[time::format_description::FormatItem<'static>] =
        format_description!("[hour]:[minute]:[second]");

    pub fn serialize<S: Serializer>(time: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        let s = time
            .format(FORMAT)
            .map_err(|e| serde::ser::Error::custom(format!("{e}")))?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let s = String::deserialize(deserializer)?;
        Time::parse(&s, FORMAT).map_err(|e| D::Error::custom(format!("{e}")))
    }

    pub mod option {
        use super::FORMAT;
        use serde::de::Error as _;
        use serde::Deserialize;
        use serde::Deserializer;
        use serde::Serializer;
        use time::Time;

        pub fn serialize<S: Serializer>(
            time: &Option<Time>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Time>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| Time::parse(&s, FORMAT).map_err(|e| D::Error::custom(format!("{e}"))))
                .transpose()
        }
    }
}

pub mod ymd {
    use serde::de::Error as _;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use time::macros::format_description;
    use time::Date;

    const FORMAT: &[time::format_description::FormatItem<'static>] =
        format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date
            .format(FORMAT)
            .map_err(|e| serde::ser::Error::custom(format!("{e}")))?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, FORMAT).map_err(|e| D::Error::custom(format!("{e}")))
    }

    pub mod option {
        use super::FORMAT;
        use serde::de::Error as _;
        use serde::Deserialize;
        use serde::Deserializer;
        use serde::Serializer;
        use time::Date;

        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| Date::parse(&s, FORMAT).map_err(|e| D::Error::custom(format!("{e}"))))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde::Serialize;
    use time::macros::date;
    use time::macros::time;

    #[derive(Serialize, Deserialize)]
    struct Wire {
        #[serde(with = "super::ymd")]
        date: time::Date,
        #[serde(with = "super::hms")]
        time: time::Time,
    }

    #[test]
    fn round_trips_date_and_time() {
        let w = Wire {
            date: date!(2024 - 06 - 01),
            time: time!(08:00:00),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"date":"2024-06-01","time":"08:00:00"}"#);

        let back: Wire = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, w.date);
        assert_eq!(back.time, w.time);
    }
}
