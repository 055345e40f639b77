//! Optional types generated by `optpack-gen` from [`types`] at build time.

pub mod types;

pub mod full {
    include!(concat!(env!("OUT_DIR"), "/full_msgpack_ext_type_gen.rs"));
}

pub mod hidden {
    include!(concat!(env!("OUT_DIR"), "/hidden_type_alias_gen.rs"));
}

pub mod duration {
    include!(concat!(env!("OUT_DIR"), "/duration_gen.rs"));
}

pub use duration::OptionalDuration;
pub use full::OptionalFullMsgpackExtType;
pub use hidden::OptionalHiddenTypeAlias;
