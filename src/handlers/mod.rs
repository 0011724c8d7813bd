// handlers/mod.rs - HTTP handlers in two tiers
//
// Public (no auth) → Protected (bearer token resolved to an Identity)
pub mod protected;
pub mod public;
