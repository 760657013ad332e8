//! # Relay server
//!
//! Authoritative hub for the multiplayer vehicle-combat demo. Clients
//! simulate their own vehicles and report transforms; the server relays them
//! to everyone else and owns the facts that must not be decided twice:
//! health, death, respawn and spawn-point assignment.
//!
//! ## Responsibilities
//!
//! - **Session registry** ([`registry`]): connection lifecycle, address to
//!   participant-id resolution, timeout cleanup, capacity limits.
//! - **Spawn arbitration** ([`spawn`]): a pooled grid of spawn points where
//!   no two simultaneously-alive participants ever share a point, degrading
//!   to least-recently-used reuse when exhausted.
//! - **Combat authority** ([`game`]): the single place health is decremented.
//!   Hit claims arrive from whichever clients observed the hit — often both
//!   the shooter's and the victim's — and an idempotency ledger keyed by
//!   (shot id, victim id) guarantees exactly one decrement per logical hit,
//!   however many claims or transport replays arrive.
//! - **Relay loop** ([`network`]): UDP receive/dispatch/broadcast tasks
//!   around a single-threaded state-owning event loop.
//!
//! ## Consistency model
//!
//! The participant map is mutated only inside the main `run` loop, and no
//! handler awaits mid-mutation, so no locking discipline beyond the loop
//! itself is needed. All timed behavior (respawn delays, ledger eviction) is
//! a deadline field checked once per tick; a deadline whose entity has since
//! disappeared fires as a no-op rather than resurrecting stale state.

pub mod game;
pub mod network;
pub mod registry;
pub mod spawn;
