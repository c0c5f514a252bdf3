pub mod candidates;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod probe;
mod rate_limit;
pub mod reviews;
pub mod site;
mod text;

pub use candidates::{extract_candidates, CandidateRule, CandidateSet};
pub use discovery::{DiscoveryOrchestrator, DiscoveryReport, DiscoveryStrategy};
pub use error::{FetchError, ScraperError};
pub use fetch::{ContentFetcher, FetchMode, HttpFetcher};
pub use probe::{probe_site, ProbeResult, ProbeStatus};
pub use reviews::{EmptyReason, ExtractionOutcome, ReviewExtraction, ReviewExtractor};
pub use site::SiteProfile;
