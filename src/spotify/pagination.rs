use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::ApiError, spotify::ApiClient};

/// How a collection endpoint is walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStrategy {
    /// Client-driven `limit`/`offset` paging; ends on a short page.
    Offset {
        url: String,
        page_size: u32,
        params: Vec<(String, String)>,
    },
    /// Server-driven paging through the `next` URL of every page.
    Cursor { url: String },
}

impl PageStrategy {
    pub fn offset(url: impl Into<String>, page_size: u32) -> Self {
        PageStrategy::Offset {
            url: url.into(),
            page_size: page_size.max(1),
            params: Vec::new(),
        }
    }

    pub fn cursor(url: impl Into<String>) -> Self {
        PageStrategy::Cursor { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<Value>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl PageResult {
    /// Reads a page payload. A page missing `items` counts as empty.
    ///
    /// `has_more` holds when a full page of `limit` items came back or the
    /// payload names a `next` page.
    pub fn from_payload(payload: &Value, limit: Option<u32>) -> Self {
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_cursor = payload
            .get("next")
            .and_then(Value::as_str)
            .map(str::to_string);
        let full_page = limit.is_some_and(|l| items.len() == l as usize);

        PageResult {
            has_more: full_page || next_cursor.is_some(),
            items,
            next_cursor,
        }
    }
}

pub struct Paginator<'a> {
    client: &'a ApiClient,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Collects every item of the collection, in server order.
    pub async fn fetch_all(&self, strategy: &PageStrategy) -> Result<Vec<Value>, ApiError> {
        let mut all = Vec::new();

        match strategy {
            PageStrategy::Offset {
                url,
                page_size,
                params,
            } => {
                let mut offset = 0;
                loop {
                    let payload = self
                        .client
                        .invoke_with_params(url, *page_size, offset, params)
                        .await?;
                    let page = PageResult::from_payload(&payload, Some(*page_size));
                    // a short page ends the walk even if it names a `next`
                    let short_page = page.items.len() < *page_size as usize;
                    all.extend(page.items);
                    offset += page_size;
                    if short_page {
                        break;
                    }
                }
            }
            PageStrategy::Cursor { url } => {
                let mut next = Some(url.clone());
                while let Some(url) = next {
                    let payload = self.client.invoke(&url).await?.into_result()?;
                    let page = PageResult::from_payload(&payload, None);
                    all.extend(page.items);
                    next = page.next_cursor;
                }
            }
        }

        Ok(all)
    }

    /// Like [`Paginator::fetch_all`], decoding each item into `T`.
    pub async fn fetch_all_as<T: DeserializeOwned>(
        &self,
        strategy: &PageStrategy,
    ) -> Result<Vec<T>, ApiError> {
        self.fetch_all(strategy)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(ApiError::Decode))
            .collect()
    }
}
