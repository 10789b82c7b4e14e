pub mod rest;
pub mod state;

// Re-export the handlers so the binary can build the router without
// reaching into the module tree.
pub use rest::{
    append_chat_message_handler, chat_turn_handler, get_session_handler,
    list_chat_messages_handler, upload_resume_handler,
};
