//! Groups past lists into day sections for the history view.

use crate::model::List;
use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("unknown sort order: {s} (valid: asc, desc)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bucket {
    Today,
    Yesterday,
    Day(NaiveDate),
}

#[derive(Debug)]
pub struct Section<'a> {
    pub title: String,
    pub lists: Vec<&'a List>,
}

/// Buckets lists by calendar day in `now`'s timezone.
///
/// "Today" comes first, then "Yesterday", then the remaining days ordered by
/// the date of their first list. Lists keep their incoming order within a section.
pub fn group_by_day<'a, Tz: TimeZone>(
    lists: &'a [List],
    now: &DateTime<Tz>,
    order: SortOrder,
) -> Vec<Section<'a>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let yesterday = today - Duration::days(1);

    let mut buckets: Vec<(Bucket, Vec<&'a List>)> = Vec::new();
    for list in lists {
        let day = list.date.with_timezone(&tz).date_naive();
        let bucket = if day == today {
            Bucket::Today
        } else if day == yesterday {
            Bucket::Yesterday
        } else {
            Bucket::Day(day)
        };
        match buckets.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, group)) => group.push(list),
            None => buckets.push((bucket, vec![list])),
        }
    }

    buckets.sort_by(|(a, a_lists), (b, b_lists)| match (a, b) {
        (Bucket::Today, _) | (_, Bucket::Today) | (Bucket::Yesterday, _) | (_, Bucket::Yesterday) => {
            a.cmp(b)
        }
        _ => {
            let (a_date, b_date) = (a_lists[0].date, b_lists[0].date);
            match order {
                SortOrder::Desc => b_date.cmp(&a_date),
                SortOrder::Asc => a_date.cmp(&b_date),
            }
        }
    });

    buckets
        .into_iter()
        .map(|(bucket, lists)| Section {
            title: match bucket {
                Bucket::Today => "Today".to_string(),
                Bucket::Yesterday => "Yesterday".to_string(),
                Bucket::Day(day) => day.format("%B %-d, %Y").to_string(),
            },
            lists,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn list_at(id: &str, date: DateTime<Utc>) -> List {
        List {
            id: id.to_string(),
            name: id.to_string(),
            date,
            items: Vec::new(),
            reminder: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn titles(sections: &[Section<'_>]) -> Vec<String> {
        sections.iter().map(|s| s.title.clone()).collect()
    }

    #[test]
    fn empty_history_has_no_sections() {
        assert!(group_by_day(&[], &at(2026, 10, 19, 12), SortOrder::Desc).is_empty());
    }

    #[test]
    fn today_and_yesterday_lead() {
        let now = at(2026, 10, 19, 12);
        let lists = vec![
            list_at("old", at(2026, 9, 1, 10)),
            list_at("y", at(2026, 10, 18, 23)),
            list_at("t1", at(2026, 10, 19, 9)),
            list_at("t2", at(2026, 10, 19, 8)),
        ];
        let sections = group_by_day(&lists, &now, SortOrder::Desc);
        assert_eq!(titles(&sections), vec!["Today", "Yesterday", "September 1, 2026"]);
        let today: Vec<&str> = sections[0].lists.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(today, vec!["t1", "t2"]);
    }

    #[test]
    fn older_days_follow_sort_order() {
        let now = at(2026, 10, 19, 12);
        let lists = vec![
            list_at("a", at(2026, 10, 10, 10)),
            list_at("b", at(2026, 8, 2, 10)),
            list_at("c", at(2026, 10, 19, 10)),
        ];
        let desc = group_by_day(&lists, &now, SortOrder::Desc);
        assert_eq!(titles(&desc), vec!["Today", "October 10, 2026", "August 2, 2026"]);
        let asc = group_by_day(&lists, &now, SortOrder::Asc);
        assert_eq!(titles(&asc), vec!["Today", "August 2, 2026", "October 10, 2026"]);
    }

    #[test]
    fn days_follow_viewer_timezone() {
        let offset = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        // 02:00 UTC on the 19th is still the 18th five hours west.
        let lists = vec![list_at("late", at(2026, 10, 19, 2))];
        let sections = group_by_day(&lists, &now, SortOrder::Desc);
        assert_eq!(titles(&sections), vec!["Yesterday"]);
    }

    #[test]
    fn sort_order_from_str() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("newest".parse::<SortOrder>().is_err());
    }
}
