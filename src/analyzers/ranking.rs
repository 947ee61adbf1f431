use crate::analyzers::types::RouteCount;

/// Default length of the route ranking.
pub const TOP_ROUTES: usize = 10;

/// Sorts store-supplied route counts descending and keeps the first `limit`.
///
/// The sort is stable, so routes with equal counts keep their input order.
pub fn rank_routes(mut counts: Vec<RouteCount>, limit: usize) -> Vec<RouteCount> {
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// The route with the most alerts, if any.
pub fn most_delayed_route(ranking: &[RouteCount]) -> Option<&str> {
    ranking.first().map(|r| r.route.as_str())
}
