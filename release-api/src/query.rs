//! Query string parsing for the release listing.

use std::borrow::Cow;
use std::collections::HashSet;
use tiller_client::release::StatusCode;
use tiller_client::services::{ListReleasesRequest, SortBy, SortOrder};

const SORT_BY: &[(&str, SortBy)] = &[
    ("unknown", SortBy::Unknown),
    ("name", SortBy::Name),
    ("last-released", SortBy::LastReleased),
];

const SORT_ORDER: &[(&str, SortOrder)] = &[("asc", SortOrder::Asc), ("desc", SortOrder::Desc)];

const STATUS_CODES: &[(&str, StatusCode)] = &[
    ("unknown", StatusCode::Unknown),
    ("deployed", StatusCode::Deployed),
    ("deleted", StatusCode::Deleted),
    ("superseded", StatusCode::Superseded),
    ("failed", StatusCode::Failed),
];

/// Builds the listing filter from a raw query string.
///
/// Parsing never fails. Missing or malformed parameters fall back to the
/// zero value of the field, and when a parameter repeats the first
/// occurrence wins.
pub fn parse_list_query(query: Option<&str>) -> ListReleasesRequest {
    let mut request = ListReleasesRequest::default();
    let Some(query) = query else {
        return request;
    };

    let mut seen: HashSet<Cow<'_, str>> = HashSet::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if !seen.insert(key.clone()) {
            continue;
        }

        match &*key {
            "limit" => request.limit = value.parse().unwrap_or_default(),
            "offset" => request.offset = value.into_owned(),
            "sort-by" => request.set_sort_by(lookup(SORT_BY, &value)),
            "filter" => request.filter = value.into_owned(),
            "sort-order" => request.set_sort_order(lookup(SORT_ORDER, &value)),
            "status-code" => {
                request.status_codes = parse_status_codes(&value)
                    .into_iter()
                    .map(i32::from)
                    .collect()
            }
            _ => {}
        }
    }

    request
}

/// Splits a comma separated list of status names.
///
/// Unrecognized names keep their position as [`StatusCode::Unknown`].
pub fn parse_status_codes(raw: &str) -> Vec<StatusCode> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|name| lookup(STATUS_CODES, name)).collect()
}

fn lookup<T: Copy + Default>(table: &[(&str, T)], name: &str) -> T {
    table
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
        .unwrap_or_default()
}

/// Whether `name` appears in the query, with or without a value.
pub fn has_flag(query: Option<&str>, name: &str) -> bool {
    query.is_some_and(|query| {
        url::form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert_eq!(parse_list_query(None), ListReleasesRequest::default());
        assert_eq!(parse_list_query(Some("")), ListReleasesRequest::default());
    }

    #[test]
    fn test_full_query() {
        let request = parse_list_query(Some(
            "limit=10&offset=web&sort-by=last-released&filter=%5Ew.*&sort-order=desc&status-code=deployed,failed",
        ));

        assert_eq!(request.limit, 10);
        assert_eq!(request.offset, "web");
        assert_eq!(request.sort_by(), SortBy::LastReleased);
        assert_eq!(request.filter, "^w.*");
        assert_eq!(request.sort_order(), SortOrder::Desc);
        assert_eq!(
            request.status_codes().collect::<Vec<_>>(),
            vec![StatusCode::Deployed, StatusCode::Failed]
        );
        assert!(request.namespace.is_empty());
    }

    #[test]
    fn test_unknown_status_keeps_slot() {
        let request = parse_list_query(Some("status-code=deployed,bogus,failed"));
        assert_eq!(request.status_codes, vec![1, 0, 4]);

        assert_eq!(
            parse_status_codes("deleted,,superseded"),
            vec![
                StatusCode::Deleted,
                StatusCode::Unknown,
                StatusCode::Superseded
            ]
        );
        assert!(parse_status_codes("").is_empty());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let request = parse_list_query(Some("limit=ten&sort-by=size&sort-order=sideways"));
        assert_eq!(request.limit, 0);
        assert_eq!(request.sort_by(), SortBy::Unknown);
        assert_eq!(request.sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_first_value_wins() {
        let request = parse_list_query(Some("limit=5&limit=7&offset=a&offset=b"));
        assert_eq!(request.limit, 5);
        assert_eq!(request.offset, "a");

        // Keys are compared after percent-decoding.
        let request =
            parse_list_query(Some("sort%2Dby=name&sort-by=last-released&filter=a&filte%72=b"));
        assert_eq!(request.sort_by(), SortBy::Name);
        assert_eq!(request.filter, "a");
    }

    #[test]
    fn test_has_flag() {
        assert!(has_flag(Some("purge"), "purge"));
        assert!(has_flag(Some("purge="), "purge"));
        assert!(has_flag(Some("purge=false"), "purge"));
        assert!(has_flag(Some("x=1&purge"), "purge"));
        assert!(!has_flag(Some("purged=true"), "purge"));
        assert!(!has_flag(Some(""), "purge"));
        assert!(!has_flag(None, "purge"));
    }
}
