// Tab rail services
// Services provide stateless functionality: URL eligibility, overlay injection, settings persistence.

pub mod injection_service;
pub mod settings_engine;
pub mod url_matching;
