//! Response envelopes used by the panel API

use serde::Deserialize;

/// `{"object": "...", "attributes": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct Item<T> {
    pub attributes: T,
}

/// `{"object": "list", "data": [...], "meta": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct List<T> {
    pub data: Vec<Item<T>>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListMeta {
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> List<T> {
    /// Whether another page follows this one
    pub fn has_next_page(&self) -> bool {
        self.meta
            .as_ref()
            .map(|m| m.pagination.current_page < m.pagination.total_pages)
            .unwrap_or(false)
    }

    pub fn into_attributes(self) -> Vec<T> {
        self.data.into_iter().map(|item| item.attributes).collect()
    }
}

/// `{"data": {"token": "...", "socket": "wss://..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct WebsocketResponse {
    pub data: WebsocketCredentials,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebsocketCredentials {
    pub token: String,
    pub socket: String,
}

/// Attributes of a signed download/upload URL
#[derive(Debug, Deserialize)]
pub(crate) struct SignedUrl {
    pub url: String,
}

/// `{"errors": [{"code": "...", "status": "...", "detail": "..."}]}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub detail: String,
}

impl ErrorBody {
    /// First human-readable detail, falling back to the error code
    pub fn first_detail(&self) -> Option<String> {
        self.errors.first().map(|e| {
            if e.detail.is_empty() {
                e.code.clone()
            } else {
                e.detail.clone()
            }
        })
    }
}
