//! Market-value acquisition from the public transfer-market API.
//!
//! [`MarketValueClient`] implements [`winning_core::acquire::ValuationSource`].
//! Every request goes through [`retry::RetryPolicy`], and consecutive players
//! are paced so the upstream is not hammered.

mod market;

pub mod error;
pub mod retry;

pub use error::{Error, Result};
pub use market::{MarketValueClient, SourceConfig, club_display_name, history_to_records};
pub use retry::RetryPolicy;
