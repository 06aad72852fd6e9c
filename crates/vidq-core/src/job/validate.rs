//! Checks a `JobRequest` before it is stored.

use std::path::Path;

use crate::error::RequestError;

use super::types::{JobRequest, Source};

/// Remote locators must be absolute http(s) URLs; local ones must name an existing file.
pub fn validate_request(request: &JobRequest) -> Result<(), RequestError> {
    let locator = request.source_locator.trim();
    if locator.is_empty() {
        return Err(RequestError::EmptyLocator);
    }
    if request.referer.is_some() && request.source != Source::AltRemote {
        return Err(RequestError::RefererNotAllowed);
    }
    match request.source {
        Source::PrimaryRemote | Source::AltRemote => {
            let parsed = url::Url::parse(locator).map_err(|e| RequestError::InvalidUrl {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;
            match parsed.scheme() {
                "http" | "https" => Ok(()),
                other => Err(RequestError::UnsupportedScheme(other.to_string())),
            }
        }
        Source::LocalFile => {
            if Path::new(locator).is_file() {
                Ok(())
            } else {
                Err(RequestError::MissingFile(locator.to_string()))
            }
        }
    }
}
