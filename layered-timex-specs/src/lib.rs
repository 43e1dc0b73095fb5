#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing for the layered-timex annotator.
//!
//! Test cases are `.toml` fixtures holding segment text, bracketed
//! sentence trees, gold time spans and the expected training instances
//! and inferred mentions.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture types and TOML parsing
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Runs fixtures and compares results
//! - [`errors`] - Error types for the fixture harness

pub mod errors;
pub mod fixture;
pub mod loader;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use fixture::{parse_fixture, Expectations, SegmentFixture, TextRef, TimexFixture};
pub use loader::{load_all_fixtures, load_fixture};
pub use runner::{check_fixture, format_failure, run_fixture, FixtureRun, Mismatch, SegmentRun};
