//! Static data records: moves, abilities, items.
//!
//! The engine never hardcodes individual moves. Formats populate a [`Dex`]
//! at startup; the pipeline reads records by [`Id`](crate::core::Id) and
//! copies them into per-use [`ActiveMove`](crate::actions::ActiveMove)s.

mod moves;
mod registry;

pub use moves::{
    Accuracy, Category, FixedDamage, HitEffect, MaxMoveData, MoveData, MoveFlags, MoveTarget, MultiHit, Ohko,
    SecondaryEffect, SelfDestruct, SelfSwitch, ZEffect, ZMoveData,
};
pub use registry::{AbilityData, Dex, ItemData, ZCrystal};
