// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// How it is used
// - The `queue_display` binary and the integration tests reach the code under test from here.

pub mod core {
    pub mod ports;
    pub mod display {
        pub mod ad_rotation;
        pub mod department;
        pub mod projection;
        pub mod push_event;
        pub mod queue_entry;
        pub mod state;
        pub mod view;
    }
}

pub mod application {
    pub mod errors;
    pub mod display_store;
    pub mod command_handlers {
        pub mod display_commands;
    }
    pub mod query_handlers {
        pub mod display_queries;
    }
    pub mod runners {
        pub mod ad_rotation_runner;
        pub mod department_loader;
        pub mod push_listener;
        pub mod snapshot_fetcher;
    }
}

pub mod adapters {
    pub mod inbound {
        pub mod graphql;
        pub mod http;
    }
    pub mod outbound {
        pub mod graphql_backend;
        pub mod json_file_settings_store;
        pub mod sse_event_source;
    }
    pub mod in_memory {
        pub mod in_memory_backend;
        pub mod in_memory_event_source;
        pub mod in_memory_settings_store;
    }
}

pub mod shell;

#[cfg(test)]
pub mod test_support {
    pub mod fixtures;
}
