//! Scene selection policy: least-cloudy scene with threshold relaxation.

use tracing::debug;

use geo_common::{BoundingBox, DateRange, ProductResult};

use crate::client::SceneCatalog;
use crate::models::SceneReference;

/// Default cloud-cover ceiling (percent) for the first search pass.
pub const PRIMARY_CLOUD_THRESHOLD: f64 = 20.0;

/// Relaxed ceiling used when the primary pass finds nothing.
pub const RELAXED_CLOUD_THRESHOLD: f64 = 60.0;

/// Find the single best scene for a bbox and date range.
///
/// Queries the catalog below `primary_threshold` and picks the scene with
/// the lowest cloud cover; if the primary pass is empty, repeats once at
/// [`RELAXED_CLOUD_THRESHOLD`]. Returns `Ok(None)` when both passes are
/// empty: absence of imagery is not an error, and transport failures
/// propagate untouched rather than masquerading as absence.
pub async fn search_best_scene<C>(
    catalog: &C,
    bbox: &BoundingBox,
    range: &DateRange,
    primary_threshold: f64,
) -> ProductResult<Option<SceneReference>>
where
    C: SceneCatalog + ?Sized,
{
    let scenes = catalog.search(bbox, range, primary_threshold).await?;
    if let Some(best) = pick_least_cloudy(scenes) {
        debug!(scene = %best.id, cloud = best.cloud_cover, "scene selected at primary threshold");
        return Ok(Some(best));
    }

    let scenes = catalog.search(bbox, range, RELAXED_CLOUD_THRESHOLD).await?;
    match pick_least_cloudy(scenes) {
        Some(best) => {
            debug!(scene = %best.id, cloud = best.cloud_cover, "scene selected at relaxed threshold");
            Ok(Some(best))
        }
        None => Ok(None),
    }
}

/// Minimum-cloud-cover selection, first-wins on ties.
///
/// Iterating in catalog order with a strict `<` comparison keeps the
/// selection deterministic for a fixed catalog response.
fn pick_least_cloudy(scenes: Vec<SceneReference>) -> Option<SceneReference> {
    scenes.into_iter().fold(None, |best, scene| match best {
        Some(b) if scene.cloud_cover < b.cloud_cover => Some(scene),
        Some(b) => Some(b),
        None => Some(scene),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geo_common::ProductError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scene(id: &str, cloud: f64) -> SceneReference {
        SceneReference {
            id: id.to_string(),
            cloud_cover: cloud,
            assets: HashMap::new(),
        }
    }

    /// Fake catalog serving a fixed scene list, filtered by threshold the
    /// way a real catalog would.
    struct FakeCatalog {
        scenes: Vec<SceneReference>,
        queries: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(scenes: Vec<SceneReference>) -> Self {
            Self {
                scenes,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SceneCatalog for FakeCatalog {
        async fn search(
            &self,
            _bbox: &BoundingBox,
            _range: &DateRange,
            max_cloud: f64,
        ) -> ProductResult<Vec<SceneReference>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .scenes
                .iter()
                .filter(|s| s.cloud_cover < max_cloud)
                .cloned()
                .collect())
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl SceneCatalog for FailingCatalog {
        async fn search(
            &self,
            _bbox: &BoundingBox,
            _range: &DateRange,
            _max_cloud: f64,
        ) -> ProductResult<Vec<SceneReference>> {
            Err(ProductError::RemoteIo("connection refused".to_string()))
        }
    }

    fn test_query() -> (BoundingBox, DateRange) {
        (
            BoundingBox::new(38.7, 9.0, 38.8, 9.1).unwrap(),
            DateRange::parse("2024-01-01", "2024-03-01").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_picks_least_cloudy_under_primary() {
        let catalog = FakeCatalog::new(vec![scene("a", 15.0), scene("b", 3.0), scene("c", 8.0)]);
        let (bbox, range) = test_query();

        let best = search_best_scene(&catalog, &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(best.id, "b");
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_match_preferred_over_relaxed() {
        // A scene only passing the relaxed ceiling must never shadow a
        // primary-threshold match.
        let catalog = FakeCatalog::new(vec![scene("cloudy", 45.0), scene("clear", 19.0)]);
        let (bbox, range) = test_query();

        let best = search_best_scene(&catalog, &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(best.id, "clear");
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relaxes_when_primary_empty() {
        let catalog = FakeCatalog::new(vec![scene("hazy", 35.0), scene("hazier", 55.0)]);
        let (bbox, range) = test_query();

        let best = search_best_scene(&catalog, &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(best.id, "hazy");
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_none_when_both_passes_empty() {
        let catalog = FakeCatalog::new(vec![scene("overcast", 92.0)]);
        let (bbox, range) = test_query();

        let best = search_best_scene(&catalog, &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
            .await
            .unwrap();
        assert!(best.is_none());
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (bbox, range) = test_query();
        let err = search_best_scene(&FailingCatalog, &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::RemoteIo(_)));
    }

    #[test]
    fn test_tie_breaks_to_catalog_order() {
        let first = pick_least_cloudy(vec![scene("first", 5.0), scene("second", 5.0)]).unwrap();
        assert_eq!(first.id, "first");
    }

    #[test]
    fn test_pick_from_empty_is_none() {
        assert!(pick_least_cloudy(vec![]).is_none());
    }
}
