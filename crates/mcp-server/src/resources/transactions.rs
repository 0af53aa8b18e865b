//! `paystack://transactions[/status/<status>][/page/<n>]`

use std::sync::Arc;

use async_trait::async_trait;
use paystack_client::PaystackClient;
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use super::Resource;
use crate::protocol::{McpError, McpResource, ResourceContents, ResourceReadResult};
use crate::tools::pretty;

pub const TRANSACTIONS_URI: &str = "paystack://transactions";

const PER_PAGE: u32 = 50;

/// Filters carried in the resource path
#[derive(Debug, Default, PartialEq)]
struct TransactionFilter {
    status: Option<String>,
    page: Option<u32>,
}

impl TransactionFilter {
    /// Read `status/<word>` and `page/<digits>` pairs; anything else is ignored
    fn from_uri(uri: &Url) -> Self {
        let segments: Vec<&str> = uri.path().split('/').filter(|s| !s.is_empty()).collect();
        let mut filter = Self::default();

        for pair in segments.windows(2) {
            match pair[0] {
                "status" if is_word(pair[1]) => filter.status = Some(pair[1].to_string()),
                "page" => {
                    if let Ok(page) = pair[1].parse() {
                        filter.page = Some(page);
                    }
                }
                _ => {}
            }
        }

        filter
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("perPage", PER_PAGE.to_string())];
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        query
    }
}

fn is_word(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub struct TransactionsList {
    client: Arc<PaystackClient>,
}

impl TransactionsList {
    pub fn new(client: Arc<PaystackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for TransactionsList {
    fn definition(&self) -> McpResource {
        McpResource {
            uri: TRANSACTIONS_URI.to_string(),
            name: "Transactions List".to_string(),
            description: Some(
                "Get a list of Paystack transactions. Supports filtering by status (success, \
                 failed, abandoned) and pagination. URI patterns: paystack://transactions, \
                 paystack://transactions/status/{status}, paystack://transactions/page/{page}"
                    .to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        }
    }

    fn matches(&self, uri: &Url) -> bool {
        uri.scheme() == "paystack" && uri.host_str() == Some("transactions")
    }

    async fn read(&self, uri: &Url) -> Result<ResourceReadResult, McpError> {
        let filter = TransactionFilter::from_uri(uri);
        let query = filter.query();

        info!("Fetching transactions list resource {} {:?}", uri, query);

        let text = match self.client.get("/transaction", &query).await {
            Ok(response) => {
                let count = response.data.as_array().map_or(0, Vec::len);
                info!(
                    "Fetched {} transactions (status: {}, page: {})",
                    count,
                    filter.status.as_deref().unwrap_or("all"),
                    filter.page.unwrap_or(1)
                );
                pretty(&response.data)?
            }
            Err(e) => {
                warn!("Transactions list resource failed: {}", e);
                pretty(&json!({ "error": e.to_string() }))?
            }
        };

        Ok(ResourceReadResult {
            contents: vec![ResourceContents::json(uri.as_str(), text)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(uri: &str) -> TransactionFilter {
        TransactionFilter::from_uri(&Url::parse(uri).unwrap())
    }

    #[test]
    fn test_bare_uri_has_default_page_size() {
        let filter = filter("paystack://transactions");
        assert_eq!(filter, TransactionFilter::default());
        assert_eq!(filter.query(), vec![("perPage", "50".to_string())]);
    }

    #[test]
    fn test_status_and_page() {
        let filter = filter("paystack://transactions/status/success/page/3");
        assert_eq!(filter.status.as_deref(), Some("success"));
        assert_eq!(filter.page, Some(3));
        assert_eq!(
            filter.query(),
            vec![
                ("perPage", "50".to_string()),
                ("status", "success".to_string()),
                ("page", "3".to_string())
            ]
        );
    }

    #[test]
    fn test_non_numeric_page_is_ignored() {
        let filter = filter("paystack://transactions/page/last");
        assert_eq!(filter.page, None);
    }

    #[test]
    fn test_matches_transactions_host() {
        let client = PaystackClient::new(paystack_client::ClientConfig::new("sk_test_unit")).unwrap();
        let resource = TransactionsList::new(Arc::new(client));
        assert!(resource.matches(&Url::parse("paystack://transactions/status/failed").unwrap()));
        assert!(!resource.matches(&Url::parse("paystack://operations/list").unwrap()));
    }
}
