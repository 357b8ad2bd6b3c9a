//! Forensic identity and field-provenance resolution for sponsor leads.
//!
//! Pure, synchronous transformations over in-memory records. Nothing in this
//! crate performs I/O or reads configuration.

pub mod discovery;
pub mod evidence;
pub mod identity;
pub mod json_extract;
mod lenient;
pub mod merge;
pub mod normalize;
pub mod verification;

pub use discovery::{discovery_schema, parse_discovered_leads, RawDiscoveredLead};
pub use evidence::{map_forensic_field, RawEvidence};
pub use identity::{get_identity_keys, shares_identity, IdentityIndex, IdentitySource};
pub use json_extract::{extract_json, extract_json_as};
pub use merge::{apply_layers, merge_supplemental_data, merge_with_report, MergeReport};
pub use normalize::{
    extract_handle, normalize_address, normalize_domain, normalize_handle, normalize_social,
    normalize_social_value, normalize_url,
};
pub use verification::{
    apply_verification, begin_verification, parse_verification, CorrectedData,
    VerificationResponse,
};
