mod response;

pub use response::{ResponseBlockView, ResponseBlockViewProps};
