//! # Game client
//!
//! Client side of the multiplayer vehicle-combat demo. The client is
//! authoritative over exactly one thing: its own vehicle's transform, which
//! it simulates every frame and reports to the relay. Everything else it
//! renders is a mirror of state decided elsewhere.
//!
//! ## Module organization
//!
//! - [`vehicle`] — local kinematics: bounded speed integration,
//!   speed-proportional steering and the candidate/commit collision step.
//! - [`game`] — the per-frame state machine: remote mirrors updated only by
//!   network events, projectiles in flight, hit-claim generation, and the
//!   death/respawn handling driven by server decisions.
//! - [`input`] — frame-sampled keyboard intents.
//! - [`network`] — a background socket thread bridged to the frame loop by
//!   channels; the frame loop never blocks on the network.
//! - [`rendering`] — top-down debug view; draws state, decides nothing.
//!
//! ## Consistency notes
//!
//! Hits are observed locally (for any projectile against any vehicle except
//! the projectile's owner) and *claimed* to the server, which owns health.
//! Duplicate observations of the same hit from different clients are
//! expected and harmless: the server's idempotency ledger applies each
//! (shot, victim) pair once. Mirrored bullet-creation events are
//! deduplicated here by shot id so transport replays never spawn a double.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod vehicle;
