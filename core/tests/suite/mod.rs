// HTTP-level tests against wiremock servers.
mod http_backend;
mod search_flow;
mod video_flow;
