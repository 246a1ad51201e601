use crate::api::PostListQuery;

pub(crate) const DEFAULT_SORT: &str = "created_at";
pub(crate) const PAGE_SIZE: i64 = 10;

/// Filter/sort/paginate state for the public post list.
///
/// `search`, `tag` and `sort_by` are derived from the address query string so
/// the view is shareable and survives reload; `page` is volatile and resets
/// to 1 whenever any filter changes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ListState {
    pub search: String,
    pub tag: String,
    pub sort_by: String,
    pub page: i64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            search: String::new(),
            tag: String::new(),
            sort_by: DEFAULT_SORT.to_string(),
            page: 1,
        }
    }
}

impl ListState {
    pub fn from_query(search: Option<String>, tag: Option<String>, sort_by: Option<String>) -> Self {
        Self {
            search: search.unwrap_or_default(),
            tag: tag.unwrap_or_default(),
            sort_by: sort_by
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SORT.to_string()),
            page: 1,
        }
    }

    pub fn with_search(&self, search: &str) -> Self {
        Self {
            search: search.to_string(),
            tag: self.tag.clone(),
            sort_by: self.sort_by.clone(),
            page: 1,
        }
    }

    /// Tag filter and text search are mutually exclusive: selecting a tag
    /// clears any active search.
    pub fn with_tag(&self, tag: &str) -> Self {
        Self {
            search: String::new(),
            tag: tag.to_string(),
            sort_by: self.sort_by.clone(),
            page: 1,
        }
    }

    pub fn with_sort(&self, sort_by: &str) -> Self {
        Self {
            search: self.search.clone(),
            tag: self.tag.clone(),
            sort_by: if sort_by.is_empty() {
                DEFAULT_SORT.to_string()
            } else {
                sort_by.to_string()
            },
            page: 1,
        }
    }

    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Address query string for this state. Empty filters are removed rather
    /// than serialized as empty params; the default sort key is left implicit.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if !self.search.is_empty() {
            pairs.push(format!("search={}", urlencoding::encode(&self.search)));
        }
        if !self.tag.is_empty() {
            pairs.push(format!("tag={}", urlencoding::encode(&self.tag)));
        }
        if !self.sort_by.is_empty() && self.sort_by != DEFAULT_SORT {
            pairs.push(format!("sort_by={}", urlencoding::encode(&self.sort_by)));
        }

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }

    /// Fetch parameters for the public list: only published posts, fixed page
    /// size.
    pub fn to_post_list_query(&self) -> PostListQuery {
        PostListQuery {
            page: Some(self.page),
            limit: Some(PAGE_SIZE),
            search: self.search.clone(),
            tag: self.tag.clone(),
            published: "true".to_string(),
            sort_by: self.sort_by.clone(),
        }
    }
}

pub(crate) fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 1;
    }
    ((total + limit - 1) / limit).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ListState::from_query(None, None, None);
        assert_eq!(s.search, "");
        assert_eq!(s.tag, "");
        assert_eq!(s.sort_by, "created_at");
        assert_eq!(s.page, 1);
    }

    #[test]
    fn test_with_search_resets_page() {
        let s = ListState::default().with_page(3).with_search("rust");
        assert_eq!(s.search, "rust");
        assert_eq!(s.page, 1);
    }

    #[test]
    fn test_tag_filter_clears_search() {
        let s = ListState::default().with_search("foo").with_page(2);
        let s = s.with_tag("go");
        assert_eq!(s.tag, "go");
        assert_eq!(s.search, "");
        assert_eq!(s.page, 1);
        assert!(!s.to_query_string().contains("search="));
        assert!(s.to_query_string().contains("tag=go"));
    }

    #[test]
    fn test_with_sort_resets_page() {
        let s = ListState::default().with_page(4).with_sort("view_count");
        assert_eq!(s.sort_by, "view_count");
        assert_eq!(s.page, 1);
    }

    #[test]
    fn test_query_string_omits_empty_and_default() {
        assert_eq!(ListState::default().to_query_string(), "");

        let s = ListState::default().with_search("hello world");
        assert_eq!(s.to_query_string(), "?search=hello%20world");

        let s = ListState::default().with_sort("likes");
        assert_eq!(s.to_query_string(), "?sort_by=likes");
    }

    #[test]
    fn test_total_pages_ceil() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_fetch_query_requests_published_only() {
        let q = ListState::default().with_tag("go").to_post_list_query();
        assert_eq!(q.published, "true");
        assert_eq!(q.limit, Some(PAGE_SIZE));
        assert_eq!(q.tag, "go");
        assert_eq!(q.page, Some(1));
    }
}
