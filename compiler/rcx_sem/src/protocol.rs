//! The lifecycle protocol vocabulary.
//!
//! Counted-reference types carry a fixed member set: the instance
//! `acquire`, the static bulk helpers `acquireAll`/`releaseAll`, and the
//! `_free` hook. The instance `release` is inherited from the marker base
//! capability — never generated, but its call sites are stripped and
//! re-derived like the rest.

/// Instance acquire: bump the count, return the receiver downcast to the
/// concrete type.
pub const ACQUIRE: &str = "acquire";

/// Instance release (inherited from the marker base).
pub const RELEASE: &str = "release";

/// Static bulk acquire over an array, skipping null elements.
pub const ACQUIRE_ALL: &str = "acquireAll";

/// Static bulk release over an array, skipping null elements.
pub const RELEASE_ALL: &str = "releaseAll";

/// Per-type finalization hook run once at count zero.
pub const FREE_HOOK: &str = "_free";

/// Members the stripper removes from counted-reference types.
pub const MEMBER_NAMES: [&str; 5] = [ACQUIRE, RELEASE, ACQUIRE_ALL, RELEASE_ALL, FREE_HOOK];

/// Calls the stripper rewrites down to their subject.
pub const CALL_NAMES: [&str; 4] = [ACQUIRE, RELEASE, ACQUIRE_ALL, RELEASE_ALL];

/// Whether `name` is a generated (or inherited) protocol member name.
pub fn is_protocol_member(name: &str) -> bool {
    MEMBER_NAMES.contains(&name)
}

/// Whether a call to `name` is a protocol call subject to stripping.
pub fn is_protocol_call(name: &str) -> bool {
    CALL_NAMES.contains(&name)
}

/// Whether a protocol call's subject is its receiver (`x.acquire()`),
/// as opposed to its sole argument (`T.acquireAll(xs)`).
pub fn is_unary_call(name: &str) -> bool {
    name == ACQUIRE || name == RELEASE
}
