//! Shared query parameter types for API handlers.

use serde::Deserialize;

pub const DEFAULT_EVENT_LIMIT: usize = 50;
pub const MAX_EVENT_LIMIT: usize = 200;

pub const DEFAULT_TRAFFIC_POINTS: usize = 24;
/// One day of five-minute samples.
pub const MAX_TRAFFIC_POINTS: usize = 288;

/// `?limit=` for the recent-events endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

impl LimitParams {
    pub fn clamped(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .clamp(1, MAX_EVENT_LIMIT)
    }
}

/// `?points=` for the traffic chart.
#[derive(Debug, Default, Deserialize)]
pub struct PointsParams {
    pub points: Option<usize>,
}

impl PointsParams {
    pub fn clamped(&self) -> usize {
        self.points
            .unwrap_or(DEFAULT_TRAFFIC_POINTS)
            .clamp(1, MAX_TRAFFIC_POINTS)
    }
}

/// `?adom=` for endpoints that default to the configured ADOM.
#[derive(Debug, Default, Deserialize)]
pub struct AdomParams {
    pub adom: Option<String>,
}

/// `?adoms=a,b` for the auth diagnostic.
#[derive(Debug, Default, Deserialize)]
pub struct AdomListParams {
    pub adoms: Option<String>,
}

impl AdomListParams {
    /// Requested ADOMs, or `default` when none were given.
    pub fn adoms_or(&self, default: &str) -> Vec<String> {
        let list: Vec<String> = self
            .adoms
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if list.is_empty() {
            vec![default.to_string()]
        } else {
            list
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(LimitParams::default().clamped(), 50);
        assert_eq!(LimitParams { limit: Some(0) }.clamped(), 1);
        assert_eq!(LimitParams { limit: Some(10_000) }.clamped(), 200);
    }

    #[test]
    fn points_are_clamped() {
        assert_eq!(PointsParams::default().clamped(), 24);
        assert_eq!(PointsParams { points: Some(0) }.clamped(), 1);
        assert_eq!(PointsParams { points: Some(500) }.clamped(), 288);
    }

    #[test]
    fn adom_list() {
        let params = AdomListParams {
            adoms: Some(" root, ,branch ".into()),
        };
        assert_eq!(params.adoms_or("x"), ["root", "branch"]);
        assert_eq!(AdomListParams::default().adoms_or("root"), ["root"]);
    }
}
