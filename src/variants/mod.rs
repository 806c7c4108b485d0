// src/variants/mod.rs
//
// The variant catalogue. `standard` owns the occidental piece set the
// others borrow; each sibling module exports one `Variant` static that the
// registry in `variant.rs` lists.

pub mod atomic;
pub mod chad;
pub mod checkers;
pub mod circe;
pub mod duck;
pub mod fischer_random;
pub mod mats;
pub mod revolt;
pub mod standard;
pub mod wotk;
