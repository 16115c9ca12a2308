use std::fmt;

use url::Url;

use crate::ApiError;

/// The fixed set of upstream API endpoints the gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `/api/v1/query`
    Query,
    /// `/api/v1/query_range`
    QueryRange,
    /// `/api/v1/label/__name__/values`
    MetricNames,
    /// `/api/v1/metadata`
    Metadata,
    /// `/api/v1/targets`
    Targets,
    /// `/api/v1/labels`
    Labels,
    /// `/api/v1/label/<name>/values`
    LabelValues(&'a str),
    /// `/api/v1/series`
    Series,
}

impl Endpoint<'_> {
    fn segments(&self) -> Vec<&str> {
        let mut segments = vec!["api", "v1"];

        match self {
            Endpoint::Query => segments.push("query"),
            Endpoint::QueryRange => segments.push("query_range"),
            Endpoint::MetricNames => segments.extend(["label", "__name__", "values"]),
            Endpoint::Metadata => segments.push("metadata"),
            Endpoint::Targets => segments.push("targets"),
            Endpoint::Labels => segments.push("labels"),
            Endpoint::LabelValues(name) => segments.extend(["label", *name, "values"]),
            Endpoint::Series => segments.push("series"),
        }

        segments
    }

    /// Appends the endpoint path to the base URL.
    ///
    /// A sub-path in the base URL is kept and every segment is percent-encoded.
    pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| ApiError::Transport {
                message: format!("{base} cannot be used as a base URL"),
            })?
            .pop_if_empty()
            .extend(self.segments());

        Ok(url)
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}
