//! List query construction: filters, sort and pagination over one entity type.
//!
//! A [`ListQuery`] is planned from raw request input against a [`FieldRegistry`]
//! and optional allow-lists. Planning never fails: malformed or disallowed
//! clauses are dropped. The plan then runs either in memory ([`ListQuery::apply`])
//! or as SQL (`crate::sql::select_list`); both apply filter, then sort, then
//! pagination, in that order.

mod record;
mod value;

pub use record::{FieldRegistry, Record};
pub use value::{compare, FieldValue, FilterValue};

use std::collections::HashSet;

pub const DEFAULT_LIMIT: u64 = 100;

/// Optional closed set of field names permitted for one purpose. Unrestricted permits all.
#[derive(Clone, Debug, Default)]
pub struct AllowList(Option<HashSet<String>>);

impl AllowList {
    pub fn any() -> Self {
        AllowList(None)
    }

    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList(Some(fields.into_iter().map(Into::into).collect()))
    }

    pub fn permits(&self, field: &str) -> bool {
        self.0.as_ref().map_or(true, |set| set.contains(field))
    }

    pub fn is_restricted(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<Vec<String>>> for AllowList {
    fn from(fields: Option<Vec<String>>) -> Self {
        AllowList(fields.map(|v| v.into_iter().collect()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case is descending; anything else, including absent, is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination window: skip `offset` records, then take up to `limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Window {
    fn default() -> Self {
        Window {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Window {
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Window {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn capped(self, max_limit: Option<u64>) -> Self {
        Window {
            limit: max_limit.map_or(self.limit, |max| self.limit.min(max)),
            ..self
        }
    }
}

/// Raw list request input, before any validation.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    /// `field:value` strings, in request order.
    pub filters: Vec<String>,
}

impl ListParams {
    /// Collect from query-string pairs. `filters` may repeat; skip/limit that
    /// do not parse as non-negative integers keep their defaults.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = ListParams::default();
        for (k, v) in pairs {
            let v: String = v.into();
            match k.as_ref() {
                "skip" | "offset" => params.skip = v.parse().ok(),
                "limit" => params.limit = v.parse().ok(),
                "sort_by" => params.sort_by = Some(v),
                "sort_dir" => params.sort_dir = Some(v),
                "filters" | "filter" => params.filters.push(v),
                _ => {}
            }
        }
        params
    }

    pub fn filter(mut self, raw: impl Into<String>) -> Self {
        self.filters.push(raw.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, dir: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self.sort_dir = Some(dir.into());
        self
    }

    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }
}

/// One equality predicate on a known field.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub field: String,
    pub value: FilterValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Validated list plan. Conditions are ANDed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub conditions: Vec<Condition>,
    pub sort: Option<SortSpec>,
    pub window: Window,
}

/// Split on the first colon; strings without one are not filters.
fn parse_filter(raw: &str) -> Option<(&str, &str)> {
    raw.split_once(':')
}

impl ListQuery {
    pub fn plan(
        registry: &FieldRegistry,
        params: &ListParams,
        filter_allow: &AllowList,
        sort_allow: &AllowList,
    ) -> Self {
        let mut conditions = Vec::new();
        for raw in &params.filters {
            let Some((field, value)) = parse_filter(raw) else {
                tracing::debug!(filter = %raw, "ignoring filter without ':'");
                continue;
            };
            if !filter_allow.permits(field) || !registry.contains(field) {
                tracing::debug!(field = %field, "ignoring filter on unknown or disallowed field");
                continue;
            }
            conditions.push(Condition {
                field: field.to_string(),
                value: FilterValue::coerce(value),
            });
        }

        let sort = params
            .sort_by
            .as_deref()
            .filter(|f| !f.is_empty() && sort_allow.permits(f) && registry.contains(f))
            .map(|f| SortSpec {
                field: f.to_string(),
                direction: SortDirection::parse(params.sort_dir.as_deref()),
            });

        ListQuery {
            conditions,
            sort,
            window: Window::new(params.skip, params.limit),
        }
    }

    pub fn capped(mut self, max_limit: Option<u64>) -> Self {
        self.window = self.window.capped(max_limit);
        self
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.conditions.iter().all(|c| {
            record
                .field(&c.field)
                .map_or(false, |v| v.matches(&c.value))
        })
    }

    /// Run the plan over an in-memory collection: filter, stable sort, paginate.
    pub fn apply<R, I>(&self, records: I) -> Vec<R>
    where
        R: Record,
        I: IntoIterator<Item = R>,
    {
        let mut rows: Vec<R> = records.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| {
                let a = a.field(&sort.field).unwrap_or(FieldValue::Null);
                let b = b.field(&sort.field).unwrap_or(FieldValue::Null);
                let ord = compare(&a, &b);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        let offset = usize::try_from(self.window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.window.limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(offset).take(limit).collect()
    }
}

/// Plan and run a list query over `base` in one call.
pub fn build<R, I>(
    base: I,
    registry: &FieldRegistry,
    params: &ListParams,
    filter_allow: &AllowList,
    sort_allow: &AllowList,
) -> Vec<R>
where
    R: Record,
    I: IntoIterator<Item = R>,
{
    ListQuery::plan(registry, params, filter_allow, sort_allow).apply(base)
}
