#![allow(dead_code)]

use std::sync::Arc;

use httpmock::MockServer;

use askbot::config::ClientConfig;
use askbot::controller::ChatController;
use askbot::surface::ChatSurface;
use askbot::transport::HttpAskTransport;

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        server_url: server.base_url(),
        ..ClientConfig::convention_defaults()
    }
}

pub fn transport_for(server: &MockServer) -> HttpAskTransport {
    HttpAskTransport::new(&config_for(server)).expect("build transport")
}

pub fn controller_for<S: ChatSurface>(server: &MockServer, surface: S) -> ChatController<S> {
    ChatController::new(Arc::new(transport_for(server)), surface)
}
