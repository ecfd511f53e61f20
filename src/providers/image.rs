//! Photo-search provider client.

use serde::Deserialize;
use url::Url;

use crate::constants::IMAGE_FETCH_FAILED;
use crate::error::QuoteCardError;

/// Success payload from the photo search endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize, Debug)]
struct Photo {
    #[serde(default)]
    src: Option<PhotoSource>,
}

#[derive(Deserialize, Debug)]
struct PhotoSource {
    #[serde(default)]
    large: Option<String>,
}

impl PhotoSearchResponse {
    /// URL of the first photo's large variant, if present.
    pub fn first_large_url(self) -> Option<String> {
        self.photos.into_iter().next()?.src?.large
    }
}

/// Searches the provider for the theme, restricted to one result, and returns
/// the first photo's large URL. A missing photo or variant yields `Ok(None)`,
/// never an error.
pub async fn search_large(
    client: &reqwest::Client,
    base: &str,
    api_key: &str,
    theme: &str,
) -> Result<Option<String>, QuoteCardError> {
    let url = Url::parse_with_params(
        &format!("{base}/v1/search"),
        [("query", theme), ("per_page", "1")],
    )
    .map_err(|err| QuoteCardError::internal(IMAGE_FETCH_FAILED, err.to_string()))?;

    let response = client
        .get(url)
        .header(reqwest::header::AUTHORIZATION, api_key)
        .send()
        .await
        .map_err(|err| QuoteCardError::internal(IMAGE_FETCH_FAILED, err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        // Unlike the quote path, upstream failures here stay generic.
        return Err(QuoteCardError::internal(
            IMAGE_FETCH_FAILED,
            format!("photo search returned {status}"),
        ));
    }

    let body: PhotoSearchResponse = response
        .json()
        .await
        .map_err(|err| QuoteCardError::internal(IMAGE_FETCH_FAILED, err.to_string()))?;

    Ok(body.first_large_url())
}
