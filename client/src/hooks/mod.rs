pub mod use_request;

pub use use_request::{Invoker, RequestHook, RequestHookReturn};
