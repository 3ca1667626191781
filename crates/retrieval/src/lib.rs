//! Retrieval of windowed ICON-2I series.
//!
//! The [`Resolver`] looks for the date partitions of each variable in the
//! source bucket. When every partition is there it reads them; otherwise it
//! backfills once through the ingestion path for all requested variables.
//! The merged partitions are normalised and cut to the requested window.

pub mod error;
pub mod resolver;

pub use error::{Result, RetrievalError};
pub use resolver::{Resolver, RetrievalQuery, RetrievedSeries};
