mod alias;
mod duration;
mod full;
pub mod subpackage;

pub use alias::HiddenTypeAlias;
pub use duration::{decode_duration, encode_duration};
pub use full::FullMsgpackExtType;
