//! List available units query
//!
//! With `training_package_code` the upstream search is narrowed to units of
//! that package.

use mediator::Request;
use serde::{Deserialize, Serialize};
use vetlearn_common::types::ComponentKind;

use crate::features::shared::PageParams;
use crate::features::training_packages::queries::ListAvailableError;
use crate::ingest::{AvailablePage, IngestService};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAvailableUnitsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_package_code: Option<String>,
}

impl Request<Result<AvailablePage, ListAvailableError>> for ListAvailableUnitsQuery {}

impl ListAvailableUnitsQuery {
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }

    /// Package code to filter by; blank means no filter
    pub fn package_filter(&self) -> &str {
        self.training_package_code.as_deref().map(str::trim).unwrap_or("")
    }
}

pub async fn handle(
    service: &IngestService,
    query: ListAvailableUnitsQuery,
) -> Result<AvailablePage, ListAvailableError> {
    let params = query.params();
    params.validate().map_err(ListAvailableError::InvalidPage)?;

    Ok(service
        .list_available(
            ComponentKind::Unit,
            query.package_filter(),
            params.page(),
            params.page_size(),
        )
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_package_filter_is_ignored() {
        let query = ListAvailableUnitsQuery {
            training_package_code: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(query.package_filter(), "");

        let query = ListAvailableUnitsQuery {
            training_package_code: Some(" BSB ".into()),
            ..Default::default()
        };
        assert_eq!(query.package_filter(), "BSB");
    }
}
