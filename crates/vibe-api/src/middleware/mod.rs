pub mod white_label;

pub use white_label::{
    white_label_middleware, MaybeWhiteLabel, WhiteLabelCache, WhiteLabelContext,
};
