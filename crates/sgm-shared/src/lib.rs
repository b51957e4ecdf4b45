//! Code shared between the SGM clients and the shape of the API they talk to

#![warn(unused_crate_dependencies)]

pub mod const_config;
pub mod errors;
pub mod id;
mod macros;
pub mod req_args;
pub mod telemetry;
pub mod token;
pub mod uac;
