#![forbid(unsafe_code)]

pub mod views;
pub mod vm;

pub use views::ResponseBlockView;
pub use vm::{
    AnswerInput, KeyPress, NavIntent, NavKey, ResponseBlockVm, apply_intent, intent_for_key,
};
