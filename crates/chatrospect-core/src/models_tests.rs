//! Unit tests for domain models.

use super::*;
use chrono::TimeZone;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("valid date")
}

#[cfg(test)]
mod role_tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Role::Primary.to_string(), "primary");
        assert_eq!(Role::Secondary.to_string(), "secondary");
    }

    #[test]
    fn other_flips() {
        assert_eq!(Role::Primary.other(), Role::Secondary);
        assert_eq!(Role::Secondary.other(), Role::Primary);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Role::Secondary).expect("serialize");
        assert_eq!(json, "\"secondary\"");
    }
}

#[cfg(test)]
mod per_role_tests {
    use super::*;

    #[test]
    fn get_and_get_mut() {
        let mut pair = PerRole::new(1, 2);
        assert_eq!(*pair.get(Role::Secondary), 2);
        *pair.get_mut(Role::Primary) += 10;
        assert_eq!(pair, PerRole::new(11, 2));
    }

    #[test]
    fn map_applies_to_both() {
        let pair = PerRole::new("a", "bb").map(str::len);
        assert_eq!(pair, PerRole::new(1, 2));
    }
}

#[cfg(test)]
mod message_tests {
    use super::*;

    #[test]
    fn accepts_message_alias() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"timestamp": "2024-01-01T00:00:00Z", "sender": "A", "message": "hi"}"#,
        )
        .expect("deserialize");
        assert_eq!(msg.text, "hi");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let at = parse_timestamp("2024-01-01T02:00:00+02:00").expect("parse");
        assert_eq!(at, utc(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn parses_zone_less_as_utc() {
        let at = parse_timestamp("2024-01-01 08:05:00").expect("parse");
        assert_eq!(at, utc(2024, 1, 1, 8, 5, 0));
    }

    #[test]
    fn time_without_date_is_none() {
        assert!(parse_timestamp("10:00").is_none());
        assert!(parse_timestamp("10:00 pm").is_none());
        assert!(parse_timestamp("1704067200").is_none());
    }

    #[test]
    fn month_name_with_year_is_parsed() {
        let at = parse_timestamp("Wed, 02 Jun 2021 06:31:39 GMT").expect("parse");
        assert_eq!(at, utc(2021, 6, 2, 6, 31, 39));
    }

    #[test]
    fn full_date_detection() {
        assert!(has_full_date("2024-01-01T08:05:00"));
        assert!(has_full_date("1/2/24 10:00"));
        assert!(has_full_date("01.02.2024"));
        assert!(has_full_date("June 5, 2024 10:00"));
        assert!(!has_full_date("June 5 10:00"));
        assert!(!has_full_date("10.5"));
    }

    #[test]
    fn lenient_fields_on_decode() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"timestamp": 17, "sender": "A", "text": null}"#)
                .expect("deserialize");
        assert_eq!(msg, ChatMessage::new("17", "A", ""));
        assert!(serde_json::from_str::<ChatMessage>(r#"{"timestamp": "t"}"#).is_err());
    }

    #[test]
    fn unparseable_is_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(ChatMessage::new("not a date", "A", "x").parsed_timestamp().is_none());
    }
}

#[cfg(test)]
mod report_shape_tests {
    use super::*;

    #[test]
    fn ghosting_end_serde() {
        let ongoing = serde_json::to_string(&GhostingEnd::Ongoing).expect("serialize");
        assert_eq!(ongoing, "\"Ongoing\"");

        let at = utc(2024, 3, 5, 9, 0, 0);
        let json = serde_json::to_string(&GhostingEnd::At(at)).expect("serialize");
        assert_eq!(json, "\"2024-03-05T09:00:00Z\"");

        let back: GhostingEnd = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, GhostingEnd::At(at));
        let back: GhostingEnd = serde_json::from_str("\"ongoing\"").expect("deserialize");
        assert_eq!(back, GhostingEnd::Ongoing);
        assert!(serde_json::from_str::<GhostingEnd>("\"soon\"").is_err());
    }

    #[test]
    fn report_uses_camel_case_keys() {
        let mut report = Report::default();
        report.ghosting_events.push(GhostingEvent {
            ghosted_role: Role::Primary,
            silent_role: Role::Secondary,
            start_timestamp: utc(2024, 3, 1, 9, 0, 0),
            end_timestamp: GhostingEnd::Ongoing,
            duration_days: 4.0,
        });

        let value = serde_json::to_value(&report).expect("serialize");
        for key in [
            "totalMessages",
            "averageResponseTime",
            "frequentWords",
            "frequentEmojis",
            "ghostingEvents",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let event = &value["ghostingEvents"][0];
        assert_eq!(event["silentRole"], "secondary");
        assert_eq!(event["endTimestamp"], "Ongoing");
        assert_eq!(value["totalMessages"]["primary"], 0);
    }
}
