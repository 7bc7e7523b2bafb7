pub mod tracks;

pub use tracks::*;
