//! Capabilities the catalog core requests from the shell, plus the upstream
//! side of `http`: base-URL validation, endpoint paths, response unwrapping
//! and the wire payloads records are decoded from.

mod http;

pub use self::http::{
    json_body, response_body, AbilitySlot, ArtworkPayload, Endpoints, HttpError, IndexPage,
    NamedResource, OtherSprites, RecordPayload, SpritesPayload, StatPayload, TypeSlot,
    ValidatedUrl,
};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

/// Upstream reads go through `http`; every state change ends with a `render`.
#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
