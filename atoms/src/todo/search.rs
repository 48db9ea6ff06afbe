use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::TodoStatus;

/// Page size applied when the search request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Search request accepted by the list operation. Every field is optional;
/// defaults are applied by [`compose_list_query`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TodoSearchPayload {
    pub is_deleted: Option<bool>,
    pub keyword: Option<String>,
    pub status: Option<TodoStatus>,
    pub due_date_gte: Option<DateTime<Utc>>,
    pub due_date_lte: Option<DateTime<Utc>>,
    pub page_size: Option<u64>,
    pub page: Option<u64>,
    pub order_bys: Option<Vec<String>>,
}

/// Predicate set evaluated by the projection store. Tenant and the delete
/// flag are always present; the optional predicates join with AND. The
/// keyword matches as a substring of name OR description.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TodoFilter {
    pub tenant_code: String,
    pub is_deleted: bool,
    pub keyword: Option<String>,
    pub status: Option<TodoStatus>,
    pub due_date: Option<DueDateRange>,
}

/// Inclusive due-date bounds; at least one side is set.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DueDateRange {
    pub gte: Option<DateTime<Utc>>,
    pub lte: Option<DateTime<Utc>>,
}

impl TodoFilter {
    /// Base filter: everything a tenant can see, deleted rows excluded.
    pub fn for_tenant(tenant_code: &str) -> Self {
        Self {
            tenant_code: tenant_code.to_string(),
            is_deleted: false,
            keyword: None,
            status: None,
            due_date: None,
        }
    }

    pub fn with_is_deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_due_date(mut self, range: DueDateRange) -> Self {
        self.due_date = Some(range);
        self
    }
}

/// Offset/limit window over the filtered rows.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One link of the order-by chain; later keys break ties of earlier ones.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Fully composed list query: filter + page window + sort chain.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoListQuery {
    pub filter: TodoFilter,
    pub page: PageWindow,
    pub order_by: Vec<SortKey>,
}

/// Translates a search payload into the query handed to the projection
/// store. Precondition, enforced upstream: `page >= 1` and `page_size >= 1`.
pub fn compose_list_query(tenant_code: &str, search: &TodoSearchPayload) -> TodoListQuery {
    let mut filter =
        TodoFilter::for_tenant(tenant_code).with_is_deleted(search.is_deleted.unwrap_or(false));

    if let Some(keyword) = search.keyword.as_deref().map(str::trim) {
        if !keyword.is_empty() {
            filter = filter.with_keyword(keyword);
        }
    }
    if let Some(status) = search.status {
        filter = filter.with_status(status);
    }
    if let Some(range) = due_date_range(search) {
        filter = filter.with_due_date(range);
    }

    let page_size = search.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let page = search.page.unwrap_or(1);

    let order_by = match &search.order_bys {
        Some(tokens) => parse_order_bys(tokens),
        None => vec![SortKey {
            field: "created_at".to_string(),
            direction: SortDirection::Desc,
        }],
    };

    TodoListQuery {
        filter,
        page: PageWindow {
            offset: page_size * (page - 1),
            limit: page_size,
        },
        order_by,
    }
}

fn due_date_range(search: &TodoSearchPayload) -> Option<DueDateRange> {
    match (search.due_date_gte, search.due_date_lte) {
        (Some(gte), Some(lte)) => Some(DueDateRange {
            gte: Some(gte),
            lte: Some(lte),
        }),
        (None, Some(lte)) => Some(DueDateRange {
            gte: None,
            lte: Some(lte),
        }),
        (Some(gte), None) => Some(DueDateRange {
            gte: Some(gte),
            lte: None,
        }),
        (None, None) => None,
    }
}

/// Maps `field` / `-field` tokens to ascending / descending sort keys,
/// preserving their order.
pub fn parse_order_bys(tokens: &[String]) -> Vec<SortKey> {
    tokens
        .iter()
        .map(|token| match token.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                direction: SortDirection::Desc,
            },
            None => SortKey {
                field: token.clone(),
                direction: SortDirection::Asc,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn defaults_exclude_deleted_and_sort_newest_first() {
        let query = compose_list_query("acme", &TodoSearchPayload::default());

        assert_eq!(query.filter.tenant_code, "acme");
        assert!(!query.filter.is_deleted);
        assert!(query.filter.keyword.is_none());
        assert!(query.filter.status.is_none());
        assert!(query.filter.due_date.is_none());
        assert_eq!(query.page, PageWindow { offset: 0, limit: 10 });
        assert_eq!(
            query.order_by,
            vec![SortKey {
                field: "created_at".to_string(),
                direction: SortDirection::Desc,
            }]
        );
    }

    #[test]
    fn page_window_arithmetic() {
        let search = TodoSearchPayload {
            page: Some(3),
            page_size: Some(10),
            ..Default::default()
        };
        let query = compose_list_query("acme", &search);
        assert_eq!(query.page, PageWindow { offset: 20, limit: 10 });
    }

    #[test]
    fn keyword_is_trimmed_and_blank_counts_as_absent() {
        let search = TodoSearchPayload {
            keyword: Some("  milk  ".to_string()),
            ..Default::default()
        };
        let query = compose_list_query("acme", &search);
        assert_eq!(query.filter.keyword.as_deref(), Some("milk"));

        let search = TodoSearchPayload {
            keyword: Some("   ".to_string()),
            ..Default::default()
        };
        let query = compose_list_query("acme", &search);
        assert!(query.filter.keyword.is_none());
    }

    #[test]
    fn due_date_bounds_compose_closed_and_one_sided_ranges() {
        let gte = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let lte = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let both = compose_list_query(
            "acme",
            &TodoSearchPayload {
                due_date_gte: Some(gte),
                due_date_lte: Some(lte),
                ..Default::default()
            },
        );
        assert_eq!(
            both.filter.due_date,
            Some(DueDateRange {
                gte: Some(gte),
                lte: Some(lte),
            })
        );

        let upper_only = compose_list_query(
            "acme",
            &TodoSearchPayload {
                due_date_lte: Some(lte),
                ..Default::default()
            },
        );
        assert_eq!(
            upper_only.filter.due_date,
            Some(DueDateRange {
                gte: None,
                lte: Some(lte),
            })
        );
    }

    #[test]
    fn order_bys_parse_into_a_tie_break_chain() {
        let chain = parse_order_bys(&["status".to_string(), "-name".to_string()]);
        assert_eq!(
            chain,
            vec![
                SortKey {
                    field: "status".to_string(),
                    direction: SortDirection::Asc,
                },
                SortKey {
                    field: "name".to_string(),
                    direction: SortDirection::Desc,
                },
            ]
        );
    }

    #[test]
    fn explicit_order_bys_replace_the_default() {
        let search = TodoSearchPayload {
            order_bys: Some(vec!["name".to_string()]),
            ..Default::default()
        };
        let query = compose_list_query("acme", &search);
        assert_eq!(query.order_by.len(), 1);
        assert_eq!(query.order_by[0].field, "name");
        assert_eq!(query.order_by[0].direction, SortDirection::Asc);
    }

    #[test]
    fn status_filter_is_attached_when_present() {
        let search = TodoSearchPayload {
            status: Some(TodoStatus::Open),
            ..Default::default()
        };
        let query = compose_list_query("acme", &search);
        assert_eq!(query.filter.status, Some(TodoStatus::Open));
    }
}
