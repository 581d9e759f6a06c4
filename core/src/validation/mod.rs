//! Verification of flow assignments
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod correctness;

pub use self::correctness::{
    brute_force_min_cut, certify_maximum, cut_capacity, verify_flow, FlowCertificate,
    FlowViolation, MinCut, MAX_BRUTE_FORCE_NODES,
};
