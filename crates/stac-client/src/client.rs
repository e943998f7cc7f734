//! Catalog transport: the `SceneCatalog` seam and the reqwest STAC client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use geo_common::{BoundingBox, DateRange, ProductError, ProductResult};

use crate::models::{ItemCollection, Link, SceneReference};

/// Hard ceiling on followed result pages, against catalogs that hand out
/// cyclic or unbounded `next` links.
const MAX_SEARCH_PAGES: usize = 50;

/// A remote scene catalog answering spatial/temporal/cloud-cover queries.
///
/// Implementations return every matching scene in catalog order; the
/// selection policy on top is transport-independent, and tests inject
/// fakes here.
#[async_trait]
pub trait SceneCatalog: Send + Sync {
    /// All scenes intersecting `bbox` and `range` with cloud cover strictly
    /// below `max_cloud`, in catalog order.
    ///
    /// Transport failures are `RemoteIo`; an empty result is not an error.
    async fn search(
        &self,
        bbox: &BoundingBox,
        range: &DateRange,
        max_cloud: f64,
    ) -> ProductResult<Vec<SceneReference>>;
}

/// STAC API client over `POST {root}/search`.
pub struct StacApi {
    client: Client,
    root: String,
    collection: String,
    page_limit: u32,
}

impl StacApi {
    /// Create a client for the given STAC root URL and collection id.
    pub fn new(root: impl Into<String>, collection: impl Into<String>) -> ProductResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ProductError::RemoteIo(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            root: root.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            page_limit: 100,
        })
    }
}

impl StacApi {
    /// Fetch one result page. POST with a body for search requests, plain
    /// GET when a `next` link carries no body of its own.
    async fn fetch_page(&self, url: &str, body: Option<&Value>) -> ProductResult<ItemCollection> {
        let request = match body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url),
        };
        let response = request
            .send()
            .await
            .map_err(|e| ProductError::RemoteIo(format!("STAC search failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProductError::RemoteIo(format!(
                "STAC search returned {} from {}",
                status, url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProductError::RemoteIo(format!("malformed STAC response: {}", e)))
    }
}

#[async_trait]
impl SceneCatalog for StacApi {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn search(
        &self,
        bbox: &BoundingBox,
        range: &DateRange,
        max_cloud: f64,
    ) -> ProductResult<Vec<SceneReference>> {
        let mut url = format!("{}/search", self.root);
        let mut body = Some(json!({
            "collections": [self.collection],
            "bbox": bbox.to_array(),
            "datetime": range.to_interval(),
            "query": { "eo:cloud_cover": { "lt": max_cloud } },
            "limit": self.page_limit,
        }));

        // Every matching scene must be on the table before selection, so
        // paged responses are followed until the catalog stops handing out
        // a `next` link.
        let mut scenes = Vec::new();
        let mut pages = 0;
        loop {
            let page = self.fetch_page(&url, body.as_ref()).await?;
            pages += 1;
            scenes.extend(page.features.into_iter().map(SceneReference::from));

            match next_request(body.as_ref(), page.links) {
                Some((next_url, next_body)) if pages < MAX_SEARCH_PAGES => {
                    url = next_url;
                    body = next_body;
                }
                Some(_) => {
                    warn!(pages, "STAC search truncated at the page ceiling");
                    break;
                }
                None => break,
            }
        }

        debug!(matches = scenes.len(), pages, max_cloud, "STAC search complete");
        Ok(scenes)
    }
}

/// Resolve the follow-up request for a paged search response.
///
/// A POST-style `next` link carries the body for the next request, either
/// complete or as a patch merged over the previous one; a bare href is
/// fetched with GET. No `next` link means the result set is exhausted.
fn next_request(
    previous_body: Option<&Value>,
    links: Vec<Link>,
) -> Option<(String, Option<Value>)> {
    let link = links.into_iter().find(|l| l.rel == "next")?;
    let method = link.method.as_deref().unwrap_or("GET");
    if !method.eq_ignore_ascii_case("POST") {
        return Some((link.href, None));
    }

    let body = match (link.body, link.merge, previous_body) {
        (Some(patch), true, Some(previous)) => Some(merge_bodies(previous.clone(), patch)),
        (Some(whole), _, _) => Some(whole),
        (None, _, previous) => previous.cloned(),
    };
    Some((link.href, body))
}

/// Overlay `patch`'s top-level fields onto `base`.
fn merge_bodies(mut base: Value, patch: Value) -> Value {
    if let (Some(base_map), Value::Object(patch_map)) = (base.as_object_mut(), patch) {
        for (key, value) in patch_map {
            base_map.insert(key, value);
        }
    }
    base
}
