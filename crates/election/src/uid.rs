//! Persistent random UID per device.

use fieldmesh_core::RoundContext;
use fieldmesh_types::Uid;
use rand::RngCore;

/// The local device's UID.
///
/// The random part is drawn once, on the device's first round, and then
/// remembered unchanged; the device id completes the pair.
pub fn random_uid(ctx: &mut RoundContext<'_>) -> Uid {
    ctx.aligned("random_uid", |ctx| {
        let bits = ctx.remember_with("bits", |rng| rng.next_u64()).value();
        Uid::from_random_bits(bits, ctx.device_id())
    })
}
