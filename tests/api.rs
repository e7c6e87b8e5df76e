#[path = "api/support.rs"]
mod support;
#[path = "api/test_issuance.rs"]
mod test_issuance;
#[path = "api/test_lookup.rs"]
mod test_lookup;
#[path = "api/test_status.rs"]
mod test_status;
