//! Expands registry definitions into the ordered fallback chain.
//!
//! Sources are taken in the order given (callers pass them sorted by
//! priority). A WFS source contributes one step per `(layer, query)`
//! pair with layers outermost; an `ArcGIS` source contributes one step
//! per query shape.

use dakstudio_neighborhood_models::{
    ArcgisQuery, NeighborhoodFetcherConfig, NeighborhoodSource, Strategy, StrategyQuery, WfsQuery,
};

/// Builds the fallback chain for `sources`.
#[must_use]
pub fn plan(sources: &[NeighborhoodSource]) -> Vec<Strategy> {
    sources.iter().flat_map(steps_for).collect()
}

fn steps_for(source: &NeighborhoodSource) -> Vec<Strategy> {
    let step = |query| Strategy {
        source_id: source.id.clone(),
        family: source.family,
        query,
    };

    match &source.fetcher {
        NeighborhoodFetcherConfig::Wfs {
            base_url,
            type_names,
            queries,
            pad_deg,
            count,
        } => type_names
            .iter()
            .flat_map(|type_name| {
                queries.iter().map(move |query| match query {
                    WfsQuery::Bbox => StrategyQuery::WfsBbox {
                        base_url: base_url.clone(),
                        type_name: type_name.clone(),
                        pad_deg: *pad_deg,
                        count: *count,
                    },
                    WfsQuery::IntersectsPoint => StrategyQuery::WfsIntersectsPoint {
                        base_url: base_url.clone(),
                        type_name: type_name.clone(),
                        count: *count,
                    },
                })
            })
            .map(step)
            .collect(),
        NeighborhoodFetcherConfig::Arcgis {
            url,
            queries,
            pad_deg,
        } => queries
            .iter()
            .map(|query| match query {
                ArcgisQuery::Point => StrategyQuery::ArcgisPoint { url: url.clone() },
                ArcgisQuery::Envelope => StrategyQuery::ArcgisEnvelope {
                    url: url.clone(),
                    pad_deg: *pad_deg,
                },
            })
            .map(step)
            .collect(),
    }
}
