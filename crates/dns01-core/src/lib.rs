// # dns01-core
//
// Core library for the DNS-01 challenge provider toolkit.
//
// ## Architecture Overview
//
// This library provides the pieces shared by every challenge provider:
// - **ChallengeProvider**: Trait for publishing and removing validation records
// - **ZoneResolver**: Trait for mapping an FQDN to its authoritative zone
// - **ChallengeLedger**: In-memory bookkeeping for in-flight challenges
// - **ProviderRegistry**: Plugin-based registry for challenge providers
// - **challenge**: Key-authorization digest and FQDN helpers (RFC 8555 §8.4)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Provider plumbing is separate from the
//    provider implementations, which live in their own crates
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: Everything here can be embedded by an ACME client
// 4. **Injected Capabilities**: Zone discovery is a one-method trait passed
//    at construction, so tests never touch live DNS

pub mod challenge;
pub mod config;
pub mod error;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{ChallengeInfo, challenge_info};
pub use config::{PropagationConfig, ProviderConfig};
pub use error::{Error, RemoteStep, Result};
pub use registry::ProviderRegistry;
pub use state::ChallengeLedger;
pub use traits::{ChallengeProvider, ChallengeProviderFactory, ZoneResolver};
