//! Proptest strategies for play inputs.

use gridiron_core::prelude::*;
use proptest::prelude::*;

/// Standard concept names.
pub const CONCEPTS: [&str; 6] = ["slant-flat", "smash", "flood", "mesh", "four-verts", "trips-seam"];

/// Standard coverage names.
pub const COVERAGES: [&str; 10] = [
    "cover-0",
    "cover-1",
    "cover-1-robber",
    "cover-2",
    "cover-2-invert",
    "tampa-2",
    "cover-3",
    "cover-3-buzz-disguise",
    "cover-4",
    "cover-6",
];

/// Any standard concept name.
pub fn concept_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CONCEPTS.to_vec())
}

/// Any standard coverage name.
pub fn coverage_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(COVERAGES.to_vec())
}

/// Any hash mark.
pub fn hash_mark() -> impl Strategy<Value = HashMark> {
    prop_oneof![
        Just(HashMark::Left),
        Just(HashMark::Middle),
        Just(HashMark::Right),
    ]
}

/// Any coverage family.
pub fn coverage_family() -> impl Strategy<Value = CoverageFamily> {
    prop::sample::select(CoverageFamily::ALL.to_vec())
}

/// Any motion type.
pub fn motion_type() -> impl Strategy<Value = MotionType> {
    prop_oneof![
        Just(MotionType::Fly),
        Just(MotionType::Jet),
        Just(MotionType::Orbit),
        Just(MotionType::Return),
        Just(MotionType::Shift),
    ]
}

/// Line of scrimmage the engine accepts without a safety or clamp.
pub fn playable_yard_line() -> impl Strategy<Value = i32> {
    2i32..=99
}

/// Separation in yards, including the degenerate ends.
pub fn separation() -> impl Strategy<Value = f32> {
    prop_oneof![0.0f32..30.0, Just(0.0f32), Just(100.0f32)]
}
