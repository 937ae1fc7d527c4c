//! Query-string merging for service URLs.

use url::Url;

use crate::error::{OgcError, Result};

/// Overwrite or add query parameters, keeping every unrelated parameter.
///
/// Existing keys are matched case-insensitively, so `service=wms` is replaced
/// by `SERVICE=WMS` rather than duplicated. Replaced keys move to the end of
/// the query in the order given.
pub fn set_query_params(url: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|e| OgcError::InvalidUrl {
        url: url.to_string(),
        details: e.to_string(),
    })?;

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name.eq_ignore_ascii_case(key)))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(params.iter().copied());

    Ok(parsed.into())
}
