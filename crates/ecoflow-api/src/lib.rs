//! Client for the EcoFlow IoT open API.
//!
//! This crate signs requests, resolves the station's serial number and maps
//! the quota endpoint onto a [`Reading`].
//!
//! # Example
//!
//! ```no_run
//! use ecoflow_api::{EcoflowClient, ReadingOutcome, DEFAULT_HOST};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EcoflowClient::new(DEFAULT_HOST, "access-key", "secret-key")?;
//!
//!     if let Some(sn) = client.resolve_device_id().await? {
//!         match client.fetch_reading(&sn).await? {
//!             ReadingOutcome::Success(reading) => println!("{}%", reading.battery_soc),
//!             ReadingOutcome::Failed(failure) => println!("API error: {}", failure),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod reading;
pub mod signer;
pub mod source;

pub use client::{EcoflowClient, DEFAULT_HOST};
pub use error::{ApiError, Result};
pub use reading::{ApiFailure, DeviceId, Reading, ReadingOutcome};
pub use signer::{SignedHeaders, Signer};
pub use source::StationSource;
