//! Development storage bootstrap.
//!
//! The server keeps assignments in memory. Caseworkers and clients come from
//! an optional JSON seed file shaped like [`SeedData`]:
//!
//! ```json
//! { "caseworkers": [ ... ], "clients": [ ... ] }
//! ```

use std::path::Path;

use caseflow_storage::{InMemoryStorage, SeedData};

use crate::error::{ApiError, ApiResult};

/// Parse seed JSON.
pub fn parse_seed(json: &str) -> ApiResult<SeedData> {
    serde_json::from_str(json)
        .map_err(|e| ApiError::invalid_input(format!("Invalid seed data: {}", e)))
}

/// Build the in-memory storage, preloaded from `path` when given.
pub fn load_storage(path: Option<&Path>) -> ApiResult<InMemoryStorage> {
    let Some(path) = path else {
        tracing::warn!("No CASEFLOW_SEED_FILE set, starting with empty storage");
        return Ok(InMemoryStorage::new());
    };

    let json = std::fs::read_to_string(path).map_err(|e| {
        ApiError::internal_error(format!("Failed to read seed file {}: {}", path.display(), e))
    })?;
    let seed = parse_seed(&json)?;
    let (caseworkers, clients) = (seed.caseworkers.len(), seed.clients.len());
    let storage = InMemoryStorage::with_seed(seed)?;

    tracing::info!(
        path = %path.display(),
        caseworkers,
        clients,
        "Loaded seed data"
    );
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use caseflow_core::{Caseworker, Client, TenantId, EntityIdType};

    #[test]
    fn test_parse_seed_roundtrips_entities() {
        let tenant = TenantId::now_v7();
        let seed = SeedData {
            caseworkers: vec![Caseworker::new(tenant, "alice")],
            clients: vec![Client::new(tenant, "carol")],
        };
        let parsed = parse_seed(&serde_json::to_string(&seed).unwrap()).unwrap();
        assert_eq!(parsed.caseworkers, seed.caseworkers);
        assert_eq!(parsed.clients, seed.clients);
    }

    #[test]
    fn test_parse_seed_allows_missing_sections() {
        let parsed = parse_seed("{}").unwrap();
        assert!(parsed.caseworkers.is_empty());
        assert!(parsed.clients.is_empty());
    }

    #[test]
    fn test_parse_seed_rejects_garbage() {
        assert_eq!(parse_seed("not json").unwrap_err().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_load_storage_without_path_is_empty() {
        let storage = load_storage(None).unwrap();
        assert_eq!(storage.assignment_count(), 0);
    }

    #[test]
    fn test_load_storage_missing_file_fails() {
        let err = load_storage(Some(Path::new("/nonexistent/caseflow-seed.json"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
