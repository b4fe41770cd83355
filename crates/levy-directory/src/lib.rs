//! # levy-directory: Rate and Zone Directory for Levy
//!
//! This crate loads rate tables from TOML files and answers the two lookups
//! levy-core's resolver needs: rates for an address, and zones by id.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Levy Data Flow                                   │
//! │                                                                         │
//! │  levy-cli (calculate / check / lookup)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                levy-directory (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   RateTable   │    │ InMemoryDirectory│   │   Errors    │  │   │
//! │  │   │  (table.rs)   │───►│   (memory.rs)    │   │ (error.rs)  │  │   │
//! │  │   │               │    │                  │   │             │  │   │
//! │  │   │ TOML parsing  │    │ zone matching    │   │ Io, Parse,  │  │   │
//! │  │   │ validation    │    │ RateDirectory    │   │ Validation  │  │   │
//! │  │   │               │    │ ZoneDirectory    │   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rates.toml                                  │   │
//! │  │   [[zones]] ... [[rates]] ...                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`table`] - Rate table file format and validation
//! - [`memory`] - In-memory directory and address matching
//! - [`error`] - Loading error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use levy_core::TaxResolver;
//! use levy_directory::InMemoryDirectory;
//!
//! let directory = InMemoryDirectory::load("rates.toml")?;
//! let resolver = TaxResolver::new(&directory, &directory);
//! let order_tax = resolver.calculate(&order)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DirectoryError, DirectoryResult};
pub use memory::{zone_matches, InMemoryDirectory};
pub use table::RateTable;

/// Rate table path used when none is configured.
pub const DEFAULT_RATES_PATH: &str = "rates.toml";

// =============================================================================
// End-to-End Tests
// =============================================================================
