//! The chat side of Laozihao.
//!
//! 1. **Prompt**: render the brand catalog into a system instruction
//! 2. **Assemble**: system prompt (first turn only) + recent history + new message
//! 3. **Complete**: send to the configured provider, return the trimmed answer
//!
//! Session bookkeeping stays with the caller: the service is stateless apart
//! from its configuration.

pub mod chat;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use chat::ChatService;
pub use prompt::build_system_prompt;
