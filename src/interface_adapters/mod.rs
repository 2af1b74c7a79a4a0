// Interface adapters: HTTP clients, wire protocol, token file, and console commands.

pub mod clients;
pub mod commands;
pub mod protocol;
pub mod token_file;
