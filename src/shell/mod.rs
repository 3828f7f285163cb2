// Composition root for the queue display.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the GraphQL backend, the SSE push source and the settings store.
// - Wire them into the display store, the handlers and the background workers.
// - Expose the HTTP router with the GraphQL endpoint.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
pub mod workers;
