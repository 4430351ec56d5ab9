//! The decision core: normalize, parse, hold conversation context, dispatch.
//! Synchronous; device calls happen behind `DomainHandler`.

pub mod context;
pub mod dispatcher;
pub mod intent;
pub mod normalize;
pub mod pipeline;
pub mod response;
pub mod time;
