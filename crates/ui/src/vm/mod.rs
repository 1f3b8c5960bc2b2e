mod keyboard;
mod response_vm;

pub use keyboard::{KeyPress, NavIntent, NavKey, apply_intent, intent_for_key, intent_for_kind};
pub use response_vm::{AnswerInput, DEFAULT_PHONE_REGION, ResponseBlockVm};
