use settld_types::TenantId;

/// The tenant id used by default across integration test fixtures.
pub fn test_tenant() -> TenantId {
    TenantId::from("tenant_test".to_string())
}
