//! Shell-facing capabilities.
//!
//! Render is Crux's built-in capability and key/value storage comes from
//! `crux_kv`; HTTP and timers are defined here so their operation types double
//! as the FFI protocol.

mod http;
mod kv;
mod timer;

pub use self::http::{
    ApiUrl, FileRef, Http, HttpBody, HttpError, HttpHeaders, HttpMethod, HttpOperation,
    HttpOutput, HttpRequest, HttpResponse, HttpResult, MultipartPart,
};
pub use self::kv::{KeyNamespace, KvError, KvKey, KvResult, NamespacedKv};
pub use self::timer::{Timer, TimerOperation, TimerOutput};
pub use crux_core::render::Render;
pub use crux_kv::KeyValue;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub timer: Timer<Event>,
    pub render: Render<Event>,
}
