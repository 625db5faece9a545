//! Serial bus servo drivers

pub mod lx16a;
